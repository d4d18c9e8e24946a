use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use docgraph::{DocumentRecord, LinkRecord};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub documents: Vec<DocumentRecord>,
    pub links: Vec<LinkRecord>,
}

/// Where the viewer reads its documents and link fetches from.
#[derive(Clone, Debug)]
pub struct DatasetSource {
    pub dataset: PathBuf,
    pub extra_links: Vec<PathBuf>,
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Link records that fail to deserialize are skipped; link data is best effort.
fn parse_link_array(values: &[Value]) -> Vec<LinkRecord> {
    values
        .iter()
        .filter_map(|value| match LinkRecord::deserialize(value) {
            Ok(link) => Some(link),
            Err(error) => {
                debug!(%error, "skipping unreadable link record");
                None
            }
        })
        .collect()
}

pub fn parse_dataset(raw: &str) -> Result<Dataset> {
    let parsed: Value = serde_json::from_str(raw).context("invalid dataset JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("dataset must be a JSON object with a `documents` array"))?;

    let documents_value = object
        .get("documents")
        .ok_or_else(|| anyhow!("dataset has no `documents` array"))?;
    let documents = Vec::<DocumentRecord>::deserialize(documents_value)
        .context("invalid `documents` array in dataset")?;

    let links = match object.get("links") {
        Some(Value::Array(values)) => parse_link_array(values),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(anyhow!("dataset `links` must be an array")),
    };

    Ok(Dataset { documents, links })
}

pub fn parse_links(raw: &str) -> Result<Vec<LinkRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid links JSON")?;
    match parsed {
        Value::Array(values) => Ok(parse_link_array(&values)),
        Value::Object(object) => match object.get("links") {
            Some(Value::Array(values)) => Ok(parse_link_array(values)),
            _ => Err(anyhow!("links file must be an array or contain a `links` array")),
        },
        _ => Err(anyhow!("links file must be an array or contain a `links` array")),
    }
}

pub fn load_dataset(source: &DatasetSource) -> Result<Dataset> {
    let mut dataset = parse_dataset(&read(&source.dataset)?)
        .with_context(|| format!("failed to load dataset {}", source.dataset.display()))?;

    for path in &source.extra_links {
        let links = parse_links(&read(path)?)
            .with_context(|| format!("failed to load links from {}", path.display()))?;
        dataset.links.extend(links);
    }

    info!(
        documents = dataset.documents.len(),
        links = dataset.links.len(),
        "dataset loaded"
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_records() {
        let dataset = parse_dataset(
            r#"{
                "documents": [
                    { "id": "a", "title": "Alpha", "updatedAt": 1700000000000 },
                    { "id": "b", "title": "Beta" }
                ],
                "links": [
                    { "id": "l1", "fromId": "a", "toId": "b", "linkText": "see beta" },
                    { "id": "l2", "fromId": "a", "toId": "z", "targetTitle": "Zulu" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(dataset.documents.len(), 2);
        assert_eq!(dataset.documents[0].updated_at, Some(1_700_000_000_000));
        assert_eq!(dataset.links[0].link_text.as_deref(), Some("see beta"));
        assert_eq!(dataset.links[1].target_title.as_deref(), Some("Zulu"));
    }

    #[test]
    fn unreadable_links_are_skipped() {
        let dataset = parse_dataset(
            r#"{ "documents": [], "links": [ { "fromId": "a" }, { "id": "ok", "toId": "b" } ] }"#,
        )
        .unwrap();
        assert_eq!(dataset.links.len(), 1);
        assert_eq!(dataset.links[0].from_id, None);
    }

    #[test]
    fn documents_are_required() {
        assert!(parse_dataset(r#"{ "links": [] }"#).is_err());
        assert!(parse_dataset("[]").is_err());
    }

    #[test]
    fn links_file_accepts_bare_array_or_wrapper() {
        let bare = parse_links(r#"[ { "id": "l1", "fromId": "a", "toId": "b" } ]"#).unwrap();
        let wrapped =
            parse_links(r#"{ "links": [ { "id": "l1", "fromId": "a", "toId": "b" } ] }"#).unwrap();
        assert_eq!(bare.len(), 1);
        assert_eq!(wrapped.len(), 1);
        assert!(parse_links("42").is_err());
    }
}
