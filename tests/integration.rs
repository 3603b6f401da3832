use character_portraits::{
    ai::{
        mock::TINY_PNG_BASE64, DescriptionClient, MockDescriptionClient, MockPortraitClient,
        PortraitClient,
    },
    app::{App, AppServices},
    image::{ImageService, MockPortraitExporter, PortraitExporter},
    models::{Config, GenerationParams},
    prompts,
    render::Panel,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http_app(server: &MockServer, params: GenerationParams) -> App {
    App::with_services(
        AppServices {
            description: Arc::new(DescriptionClient::new(
                format!("{}/describe", server.uri()),
                None,
            )),
            portrait: Arc::new(PortraitClient::new(
                format!("{}/generate", server.uri()),
                None,
            )),
            exporter: None,
        },
        params,
        prompts::PORTRAIT_TEMPLATE.to_string(),
    )
}

fn config_for(server: &MockServer, batch_size: &str) -> Config {
    let description_url = format!("{}/describe", server.uri());
    let portrait_url = format!("{}/generate", server.uri());
    let batch_size = batch_size.to_string();
    Config::from_lookup(move |key| match key {
        "DESCRIPTION_ENDPOINT_URL" => Some(description_url.clone()),
        "PORTRAIT_ENDPOINT_URL" => Some(portrait_url.clone()),
        "PORTRAIT_BATCH_SIZE" => Some(batch_size.clone()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe"))
        .and(query_param("book", "Dune"))
        .and(query_param("character", "Paul"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!("tall, stern, grey eyes")),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(serde_json::json!({
            "prompt": "Portrait of tall, stern, grey eyes, by Greg Rutkowski, digital painting",
            "samples": 1,
            "steps": 50,
            "batch_size": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(TINY_PNG_BASE64))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = http_app(&server, GenerationParams::default());
    let screen = app.run_once("Dune", "Paul").await.unwrap();

    assert_eq!(app.editor().draft(), "tall, stern, grey eyes");
    assert!(app.prompt().state().is_success());
    assert_eq!(app.portrait().images(), [TINY_PNG_BASE64]);

    let Panel::Portraits(views) = screen.portraits else {
        panic!("expected portraits panel");
    };
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].dimensions, Some((1, 1)));
}

#[tokio::test]
async fn test_query_string_is_percent_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("stooped")))
        .mount(&server)
        .await;

    let mut app = http_app(&server, GenerationParams::default());
    app.set_book("War & Peace");
    app.set_character("Pierre/Bezukhov?");
    assert!(app.submit());
    app.settle().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.query(),
        Some("book=War%20%26%20Peace&character=Pierre%2FBezukhov%3F")
    );
}

#[tokio::test]
async fn test_empty_field_issues_no_request() {
    let server = MockServer::start().await;

    let mut app = http_app(&server, GenerationParams::default());
    app.set_book("Dune");
    app.set_character("");
    assert!(!app.submit());
    assert!(app.prompt().state().is_idle());

    let requests = server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_batch_response_renders_every_image_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "description": "young woman, red cloak" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .and(body_json(serde_json::json!({
            "prompt": "Portrait of young woman, red cloak, by Greg Rutkowski, digital painting",
            "samples": 1,
            "steps": 50,
            "batch_size": 3
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["a", "b", "c"])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, "3");
    let mut app = App::from_config(&config, None).unwrap();
    let screen = app.run_once("Grimm", "Red Riding Hood").await.unwrap();

    assert_eq!(app.portrait().images(), ["a", "b", "c"]);
    let Panel::Portraits(views) = screen.portraits else {
        panic!("expected portraits panel");
    };
    assert_eq!(
        views.iter().map(|v| v.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[tokio::test]
async fn test_description_failure_never_stays_loading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut app = http_app(&server, GenerationParams::default());
    let screen = app.run_once("Dune", "Paul").await.unwrap();

    assert!(app.prompt().state().is_error());
    assert!(!screen.description.is_spinner());
    assert!(matches!(screen.description, Panel::Failed { .. }));
    assert!(app.portrait().state().is_idle());
}

#[tokio::test]
async fn test_portrait_failure_never_stays_loading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("grey eyes")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("CUDA out of memory"))
        .mount(&server)
        .await;

    let mut app = http_app(&server, GenerationParams::default());
    let screen = app.run_once("Dune", "Paul").await.unwrap();

    assert!(app.portrait().state().is_error());
    assert!(matches!(screen.portraits, Panel::Failed { .. }));
    assert!(screen.to_string().contains("retry"));
}

#[tokio::test]
async fn test_new_description_overwrites_edits() {
    let description = MockDescriptionClient::new()
        .with_description("first description".to_string())
        .with_description("second description".to_string());
    let portrait = MockPortraitClient::new();
    let mut app = App::with_services(
        AppServices {
            description: Arc::new(description),
            portrait: Arc::new(portrait.clone()),
            exporter: None,
        },
        GenerationParams::default(),
        prompts::PORTRAIT_TEMPLATE.to_string(),
    );

    app.set_book("Emma");
    app.set_character("Emma Woodhouse");
    app.submit();
    app.settle().await;
    app.edit_draft("my own words");

    app.submit();
    app.settle().await;
    assert_eq!(app.editor().draft(), "second description");

    app.generate_portraits();
    app.settle().await;
    assert_eq!(
        portrait.get_requests()[0].prompt,
        "Portrait of second description, by Greg Rutkowski, digital painting"
    );
}

#[tokio::test]
async fn test_exports_real_files() {
    let dir = tempfile::tempdir().unwrap();
    let exporter: Box<dyn ImageService> = Box::new(PortraitExporter::new(dir.path()).unwrap());

    let mut app = App::with_services(
        AppServices {
            description: Arc::new(MockDescriptionClient::new()),
            portrait: Arc::new(MockPortraitClient::new()),
            exporter: Some(exporter),
        },
        GenerationParams {
            batch_size: 2,
            ..GenerationParams::default()
        },
        prompts::PORTRAIT_TEMPLATE.to_string(),
    );

    app.run_once("Dune", "Paul Atreides").await.unwrap();

    assert_eq!(app.exported().len(), 2);
    for path in app.exported() {
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("paul-atreides_"));
    }
}

#[tokio::test]
async fn test_export_failure_keeps_success_state() {
    let exporter = MockPortraitExporter::new().with_failure(true);
    let mut app = App::with_services(
        AppServices {
            description: Arc::new(MockDescriptionClient::new()),
            portrait: Arc::new(MockPortraitClient::new()),
            exporter: Some(Box::new(exporter)),
        },
        GenerationParams::default(),
        prompts::PORTRAIT_TEMPLATE.to_string(),
    );

    app.run_once("Dune", "Paul").await.unwrap();
    assert!(app.portrait().state().is_success());
    assert!(app.exported().is_empty());
}
