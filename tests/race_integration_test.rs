use cep_race::config::toml_config::{EndpointConfig, LookupConfig};
use cep_race::core::race::{ERROR_PREFIX, TIMEOUT_NOTICE};
use cep_race::{
    AddressProvider, BrasilApiClient, Deadline, LookupErrorKind, LookupResult, ProviderKind,
    RaceOrchestrator, RaceOutcome, ViaCepClient,
};
use httpmock::prelude::*;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const CEP: &str = "03373100";

fn brasil_api_body() -> serde_json::Value {
    serde_json::json!({
        "cep": "03373100",
        "state": "SP",
        "city": "São Paulo",
        "neighborhood": "X",
        "street": "Y",
        "service": "Z"
    })
}

fn via_cep_body() -> serde_json::Value {
    serde_json::json!({
        "cep": "03373-100",
        "logradouro": "Rua Exemplo",
        "complemento": "",
        "unidade": "",
        "bairro": "Vila Formosa",
        "localidade": "São Paulo",
        "uf": "SP",
        "ibge": "3550308",
        "gia": "1004",
        "ddd": "11",
        "siafi": "7107"
    })
}

/// 兩個供應商都指向同一個 mock server 的不同路徑
fn config_for(server: &MockServer, timeout_ms: u64) -> LookupConfig {
    let mut config = LookupConfig::default();
    config.lookup.timeout_ms = timeout_ms;
    config.providers.brasil_api = EndpointConfig::new(server.url("/api/cep/v1/{cep}"));
    config.providers.via_cep = EndpointConfig::new(server.url("/ws/{cep}/json/"));
    config
}

#[tokio::test]
async fn test_brasil_api_wins_when_via_cep_is_slow() {
    let server = MockServer::start();
    let brasil_mock = server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200)
            .delay(Duration::from_millis(800))
            .json_body(via_cep_body());
    });

    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 1_000)));
    let outcome = orchestrator.run(CEP).await;
    let rendered = outcome.render();

    brasil_mock.assert();
    assert!(matches!(outcome, RaceOutcome::Found { .. }));
    assert!(rendered.starts_with("-=- BRASIL API -=- "));
    assert!(rendered.contains("CEP: 03373100"));
    assert!(rendered.contains("Estado: SP"));
    assert!(!rendered.contains("VIA CEP"));
}

#[tokio::test]
async fn test_via_cep_wins_when_brasil_api_is_slow() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200)
            .delay(Duration::from_millis(800))
            .json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200).json_body(via_cep_body());
    });

    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 1_000)));
    let rendered = orchestrator.run(CEP).await.render();

    assert!(rendered.starts_with("-=- VIA CEP -=- "));
    assert!(rendered.contains("Logradouro: Rua Exemplo"));
    assert!(rendered.contains("IBGE: 3550308"));
}

#[tokio::test]
async fn test_both_succeed_prints_exactly_one_block() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200).json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200).json_body(via_cep_body());
    });

    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 1_000)));
    let rendered = orchestrator.run(CEP).await.render();

    let blocks = rendered.matches("-=- BRASIL API -=- ").count()
        + rendered.matches("-=- VIA CEP -=- ").count();
    assert_eq!(blocks, 1, "unexpected output: {rendered}");
}

#[tokio::test]
async fn test_success_or_failure_race_tolerates_either() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200).json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200).body("not json");
    });

    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 1_000)));
    let rendered = orchestrator.run(CEP).await.render();

    let is_brasil_block = rendered.starts_with("-=- BRASIL API -=- ");
    let is_via_cep_error = rendered.starts_with(&format!("{} ViaCEP:", ERROR_PREFIX));
    assert!(is_brasil_block || is_via_cep_error, "unexpected output: {rendered}");
}

#[tokio::test]
async fn test_both_fail_prints_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(500).body("internal error");
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(400).body("<h1>Bad Request</h1>");
    });

    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 1_000)));
    let outcome = orchestrator.run(CEP).await;

    assert!(matches!(outcome, RaceOutcome::Failed { .. }));
    let rendered = outcome.render();
    assert!(rendered.starts_with(ERROR_PREFIX));
    assert!(rendered.contains("BrasilAPI") || rendered.contains("ViaCEP"));
    assert_eq!(rendered.lines().count(), 1);
}

#[tokio::test]
async fn test_both_slow_prints_only_the_timeout_notice() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200)
            .delay(Duration::from_millis(1_500))
            .json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200)
            .delay(Duration::from_millis(1_500))
            .json_body(via_cep_body());
    });

    let config = config_for(&server, 300);
    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config));
    let outcome = orchestrator.run(CEP).await;

    assert!(outcome.is_timeout());
    assert_eq!(outcome.render(), TIMEOUT_NOTICE);
    // 截止時間加上取消等待的上限
    assert!(outcome.elapsed() < Duration::from_millis(300 + 1_000));
}

#[tokio::test]
async fn test_strict_status_reports_status_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/99999999");
        then.status(404)
            .json_body(serde_json::json!({"name": "CepPromiseError", "type": "service_error"}));
    });

    let mut config = config_for(&server, 1_000);
    config.lookup.reject_non_success_status = true;
    let client = assert_ok!(BrasilApiClient::new(
        &config.providers.brasil_api,
        &config.lookup
    ));

    let err = assert_err!(
        client
            .lookup(Deadline::after(Duration::from_secs(1)), "99999999")
            .await
    );
    assert_eq!(err.provider, ProviderKind::BrasilApi);
    assert!(matches!(err.kind, LookupErrorKind::Status(_)));
}

#[tokio::test]
async fn test_lenient_status_decodes_error_payload() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/ws/99999999/json/");
        then.status(200).json_body(serde_json::json!({"erro": "true"}));
    });

    let config = config_for(&server, 1_000);
    let client = assert_ok!(ViaCepClient::new(&config.providers.via_cep, &config.lookup));
    assert_eq!(client.kind(), ProviderKind::ViaCep);

    let result = assert_ok!(
        client
            .lookup(Deadline::after(Duration::from_secs(1)), "99999999")
            .await
    );
    match result {
        LookupResult::ViaCep(address) => assert!(address.cep.is_empty()),
        other => panic!("expected a ViaCEP record, got {:?}", other),
    }
}

#[tokio::test]
async fn test_request_timeouts_at_deadline_always_print_timeout_notice() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/cep/v1/03373100");
        then.status(200)
            .delay(Duration::from_millis(400))
            .json_body(brasil_api_body());
    });
    server.mock(|when, then| {
        when.method(GET).path("/ws/03373100/json/");
        then.status(200)
            .delay(Duration::from_millis(400))
            .json_body(via_cep_body());
    });

    // reqwest 的逾時與截止時間同時觸發
    let orchestrator = assert_ok!(RaceOrchestrator::from_config(&config_for(&server, 80)));
    for _ in 0..20 {
        let outcome = orchestrator.run(CEP).await;
        assert_eq!(outcome.render(), TIMEOUT_NOTICE);
    }
}
