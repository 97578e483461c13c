//! SPARQL payloads for the revision and metadata facts (mu.semte.ch vocabulary).

use crate::domain::model::{Command, ServiceMetadata, ServiceVersionLink, VersionRecord};
use crate::utils::error::{Result, SyncError};

pub const REVISION_BASE_URI: &str = "http://info.mu.semte.ch/microservice-revisions/";
pub const COMMAND_BASE_URI: &str = "http://info.mu.semte.ch/microservice-commands/";

const PREFIXES: &str = "PREFIX dct: <http://purl.org/dc/terms/>
PREFIX ext: <http://mu.semte.ch/vocabularies/ext/>
PREFIX mu: <http://mu.semte.ch/vocabularies/core/>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>";

/// Escapes a value for use inside a double-quoted SPARQL string literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Wraps `value` in angle brackets, rejecting characters IRIs may not contain.
pub fn iri(value: &str) -> Result<String> {
    let invalid = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\'));
    if invalid {
        return Err(SyncError::store(format!("Invalid IRI: {:?}", value)));
    }
    Ok(format!("<{}>", value))
}

pub fn revision_uri(identifier: &str) -> String {
    format!("{}{}", REVISION_BASE_URI, identifier)
}

pub fn command_uri(identifier: &str) -> String {
    format!("{}{}", COMMAND_BASE_URI, identifier)
}

pub fn tracked_services(graph: &str) -> Result<String> {
    Ok(format!(
        "{PREFIXES}
SELECT DISTINCT ?service ?title ?uuid ?gitRepository
WHERE {{
  GRAPH {graph} {{
    ?service a ext:Microservice ;
             dct:title ?title ;
             ext:isCoreMicroservice \"true\"^^xsd:boolean .
    OPTIONAL {{ ?service mu:uuid ?uuid }}
    OPTIONAL {{ ?service ext:gitRepository ?gitRepository }}
  }}
}}",
        graph = iri(graph)?
    ))
}

pub fn revision_id(graph: &str, image: &str, version: &str) -> Result<String> {
    Ok(format!(
        "{PREFIXES}
SELECT ?uuid
WHERE {{
  GRAPH {graph} {{
    ?revision a ext:MicroserviceRevision ;
              mu:uuid ?uuid ;
              ext:microserviceRevision \"{image}\" ;
              ext:microserviceVersion \"{version}\" .
  }}
}}
ORDER BY ?uuid
LIMIT 1",
        graph = iri(graph)?,
        image = escape_literal(image),
        version = escape_literal(version)
    ))
}

pub fn insert_revision(graph: &str, record: &VersionRecord) -> Result<String> {
    Ok(format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
    {revision} a ext:MicroserviceRevision ;
               mu:uuid \"{uuid}\" ;
               ext:microserviceRevision \"{image}\" ;
               ext:microserviceVersion \"{version}\" .
  }}
}}",
        graph = iri(graph)?,
        revision = iri(&revision_uri(&record.identifier))?,
        uuid = escape_literal(&record.identifier),
        image = escape_literal(&record.image),
        version = escape_literal(&record.version)
    ))
}

pub fn insert_link(graph: &str, link: &ServiceVersionLink) -> Result<String> {
    Ok(format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
    {service} ext:hasRevision {revision} .
  }}
}}",
        graph = iri(graph)?,
        service = iri(&link.service)?,
        revision = iri(&revision_uri(&link.record))?
    ))
}

/// Removes the snippets and every command resource attached to `service`.
pub fn delete_metadata(graph: &str, service: &str) -> Result<String> {
    let graph = iri(graph)?;
    let service = iri(service)?;
    let delete_predicate = |predicate: &str| {
        format!(
            "DELETE {{ GRAPH {graph} {{ {service} {predicate} ?value }} }}
WHERE {{ GRAPH {graph} {{ {service} {predicate} ?value }} }}"
        )
    };

    Ok(format!(
        "{PREFIXES}
{compose} ;
{creation} ;
{development} ;
DELETE {{ GRAPH {graph} {{ {service} ext:hasCommand ?command . ?command ?p ?o }} }}
WHERE {{ GRAPH {graph} {{ {service} ext:hasCommand ?command . ?command ?p ?o }} }}",
        compose = delete_predicate("ext:composeSnippet"),
        creation = delete_predicate("ext:creationSnippet"),
        development = delete_predicate("ext:developmentSnippet"),
    ))
}

/// Inserts snippets and commands; `command_ids` pairs with `metadata.commands` by position.
pub fn insert_metadata(
    graph: &str,
    service: &str,
    metadata: &ServiceMetadata,
    command_ids: &[String],
) -> Result<String> {
    let service_iri = iri(service)?;
    let mut body = format!(
        "    {service_iri} ext:composeSnippet \"{}\" ;
        ext:creationSnippet \"{}\" ;
        ext:developmentSnippet \"{}\" .",
        escape_literal(&metadata.compose_snippet),
        escape_literal(&metadata.creation_snippet),
        escape_literal(&metadata.development_snippet)
    );

    for (command, id) in metadata.commands.iter().zip(command_ids) {
        body.push('\n');
        body.push_str(&command_triples(&service_iri, command, id)?);
    }

    Ok(format!(
        "{PREFIXES}
INSERT DATA {{
  GRAPH {graph} {{
{body}
  }}
}}",
        graph = iri(graph)?
    ))
}

fn command_triples(service_iri: &str, command: &Command, id: &str) -> Result<String> {
    let command_iri = iri(&command_uri(id))?;
    Ok(format!(
        "    {service_iri} ext:hasCommand {command_iri} .
    {command_iri} a ext:MicroserviceCommand ;
        mu:uuid \"{uuid}\" ;
        ext:commandTitle \"{title}\" ;
        ext:shellCommand \"{shell}\" ;
        dct:description \"{description}\" .",
        uuid = escape_literal(id),
        title = escape_literal(&command.title),
        shell = escape_literal(&command.shell_command),
        description = escape_literal(&command.description)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPH: &str = "http://mu.semte.ch/application";

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("plain"), "plain");
        assert_eq!(escape_literal("a \"quoted\"\nline"), "a \\\"quoted\\\"\\nline");
        assert_eq!(escape_literal("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_iri_rejects_injection() {
        assert_eq!(iri("http://example.com/a").unwrap(), "<http://example.com/a>");
        assert!(iri("http://example.com/a> } ; DROP ALL ; {").is_err());
        assert!(iri("").is_err());
    }

    #[test]
    fn test_tracked_services_filters_on_core_flag() {
        let query = tracked_services(GRAPH).unwrap();
        assert!(query.contains("GRAPH <http://mu.semte.ch/application>"));
        assert!(query.contains("ext:isCoreMicroservice \"true\"^^xsd:boolean"));
        assert!(query.contains("dct:title ?title"));
    }

    #[test]
    fn test_revision_lookup_matches_image_and_version() {
        let query = revision_id(GRAPH, "semtech/auth-service", "1.0.0").unwrap();
        assert!(query.contains("ext:microserviceRevision \"semtech/auth-service\""));
        assert!(query.contains("ext:microserviceVersion \"1.0.0\""));
        assert!(query.contains("LIMIT 1"));
    }

    #[test]
    fn test_insert_revision_and_link() {
        let record = VersionRecord {
            identifier: "abc".to_string(),
            image: "semtech/auth-service".to_string(),
            version: "1.0.0".to_string(),
        };
        let update = insert_revision(GRAPH, &record).unwrap();
        assert!(update.contains("INSERT DATA"));
        assert!(update.contains(
            "<http://info.mu.semte.ch/microservice-revisions/abc> a ext:MicroserviceRevision"
        ));
        assert!(update.contains("mu:uuid \"abc\""));

        let link = ServiceVersionLink {
            service: "http://example.com/services/auth".to_string(),
            record: "abc".to_string(),
        };
        let update = insert_link(GRAPH, &link).unwrap();
        assert!(update.contains(
            "<http://example.com/services/auth> ext:hasRevision <http://info.mu.semte.ch/microservice-revisions/abc>"
        ));
    }

    #[test]
    fn test_insert_metadata_with_commands() {
        let metadata = ServiceMetadata {
            compose_snippet: "image: semtech/auth\nlinks: []".to_string(),
            creation_snippet: String::new(),
            development_snippet: String::new(),
            commands: vec![Command {
                title: "build".to_string(),
                shell_command: "make build".to_string(),
                description: "Builds it".to_string(),
            }],
        };

        let update = insert_metadata(
            GRAPH,
            "http://example.com/services/auth",
            &metadata,
            &["cmd-1".to_string()],
        )
        .unwrap();

        assert!(update.contains("ext:composeSnippet \"image: semtech/auth\\nlinks: []\""));
        assert!(update.contains(
            "<http://example.com/services/auth> ext:hasCommand <http://info.mu.semte.ch/microservice-commands/cmd-1>"
        ));
        assert!(update.contains("ext:shellCommand \"make build\""));
    }

    #[test]
    fn test_delete_metadata_is_one_request() {
        let update = delete_metadata(GRAPH, "http://example.com/services/auth").unwrap();
        assert_eq!(update.matches("DELETE {").count(), 4);
        assert!(update.contains("ext:hasCommand ?command"));
    }
}
