use httpmock::prelude::*;
use revision_sync::adapters::sparql::{queries, DEFAULT_GRAPH};
use revision_sync::adapters::{
    DockerHubTagProvider, HttpGraphStoreClient, SequentialIdGenerator, SparqlStore,
};
use revision_sync::domain::model::{ServiceVersionLink, VersionRecord};
use revision_sync::{ReconcileConfig, ReconciliationEngine, SyncError};
use std::sync::Arc;

const SERVICE_URI: &str = "http://mu.semte.ch/services/auth";

fn engine(
    server: &MockServer,
) -> ReconciliationEngine<SparqlStore<HttpGraphStoreClient>, DockerHubTagProvider> {
    let ids = Arc::new(SequentialIdGenerator::new("rev"));
    let store = SparqlStore::new(
        HttpGraphStoreClient::new(server.url("/sparql")),
        DEFAULT_GRAPH,
        ids.clone(),
    );
    ReconciliationEngine::with_id_generator(
        Arc::new(store),
        DockerHubTagProvider::new(server.base_url()),
        ids,
        ReconcileConfig {
            // one tag at a time so identifiers are handed out in tag order
            concurrent_writes: 1,
            ..ReconcileConfig::default()
        },
    )
}

fn mock_discovery(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .x_www_form_urlencoded_tuple("query", queries::tracked_services(DEFAULT_GRAPH).unwrap().as_str());
        then.status(200)
            .header("Content-Type", "application/sparql-results+json")
            .json_body(serde_json::json!({
                "head": {"vars": ["service", "title", "uuid", "gitRepository"]},
                "results": {"bindings": [{
                    "service": {"type": "uri", "value": SERVICE_URI},
                    "title": {"type": "literal", "value": "auth-service"}
                }]}
            }));
    })
}

fn mock_lookup<'a>(server: &'a MockServer, version: &str, existing: Option<&str>) -> httpmock::Mock<'a> {
    let bindings = match existing {
        Some(id) => serde_json::json!([{"uuid": {"type": "literal", "value": id}}]),
        None => serde_json::json!([]),
    };
    let query = queries::revision_id(DEFAULT_GRAPH, "semtech/auth-service", version).unwrap();
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .x_www_form_urlencoded_tuple("query", query.as_str());
        then.status(200)
            .header("Content-Type", "application/sparql-results+json")
            .json_body(serde_json::json!({
                "head": {"vars": ["uuid"]},
                "results": {"bindings": bindings}
            }));
    })
}

fn mock_tags(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/repositories/semtech/auth-service/tags")
            .query_param("page_size", "100")
            .query_param("page", "1");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "count": 2,
                "next": null,
                "results": [{"name": "1.0.0"}, {"name": "1.0.1"}]
            }));
    })
}

fn mock_writes<'a>(server: &'a MockServer, identifier: &str, version: &str) -> [httpmock::Mock<'a>; 2] {
    let record = VersionRecord {
        identifier: identifier.to_string(),
        image: "semtech/auth-service".to_string(),
        version: version.to_string(),
    };
    let link = ServiceVersionLink {
        service: SERVICE_URI.to_string(),
        record: identifier.to_string(),
    };
    let insert_record = queries::insert_revision(DEFAULT_GRAPH, &record).unwrap();
    let insert_link = queries::insert_link(DEFAULT_GRAPH, &link).unwrap();

    [
        server.mock(|when, then| {
            when.method(POST)
                .path("/sparql")
                .x_www_form_urlencoded_tuple("update", insert_record.as_str());
            then.status(204);
        }),
        server.mock(|when, then| {
            when.method(POST)
                .path("/sparql")
                .x_www_form_urlencoded_tuple("update", insert_link.as_str());
            then.status(204);
        }),
    ]
}

#[tokio::test]
async fn test_new_versions_are_inserted_over_sparql() {
    let server = MockServer::start();
    let discovery = mock_discovery(&server);
    let tags = mock_tags(&server);
    let lookups = [
        mock_lookup(&server, "1.0.0", None),
        mock_lookup(&server, "1.0.1", None),
    ];
    let first = mock_writes(&server, "rev-1", "1.0.0");
    let second = mock_writes(&server, "rev-2", "1.0.1");

    let result = engine(&server).run().await.unwrap();

    discovery.assert();
    tags.assert();
    for mock in lookups.iter().chain(first.iter()).chain(second.iter()) {
        mock.assert();
    }
    assert!(result.is_complete_success());
    assert_eq!(result.versions_written, 2);
    assert_eq!(result.versions_minted, 2);
}

#[tokio::test]
async fn test_recorded_versions_reuse_their_identifier() {
    let server = MockServer::start();
    mock_discovery(&server);
    mock_tags(&server);
    mock_lookup(&server, "1.0.0", Some("known-100"));
    mock_lookup(&server, "1.0.1", None);
    let reused = mock_writes(&server, "known-100", "1.0.0");
    let minted = mock_writes(&server, "rev-1", "1.0.1");

    let result = engine(&server).run().await.unwrap();

    for mock in reused.iter().chain(minted.iter()) {
        mock.assert();
    }
    assert_eq!(result.versions_minted, 1);
    assert_eq!(result.versions_written, 2);
}

#[tokio::test]
async fn test_unreachable_store_aborts_before_any_update() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .x_www_form_urlencoded_key_exists("query");
        then.status(503).body("Service Unavailable");
    });
    let updates = server.mock(|when, then| {
        when.method(POST)
            .path("/sparql")
            .x_www_form_urlencoded_key_exists("update");
        then.status(204);
    });
    let tags = mock_tags(&server);

    let err = engine(&server).run().await.unwrap_err();

    assert!(matches!(err, SyncError::DiscoveryError { ref message } if message.contains("503")));
    updates.assert_hits(0);
    tags.assert_hits(0);
}

#[tokio::test]
async fn test_registry_outage_is_reported_per_service() {
    let server = MockServer::start();
    mock_discovery(&server);
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/repositories/semtech/auth-service/tags");
        then.status(500);
    });

    let result = engine(&server).run().await.unwrap();

    assert_eq!(result.services_discovered, 1);
    assert_eq!(result.services_processed, 0);
    assert!(result.is_total_failure());
    assert!(matches!(
        &result.errors[0],
        SyncError::TagFetchError { service, .. } if service == "auth-service"
    ));
}
