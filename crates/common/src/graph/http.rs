//! HTTP client for the graph store
//!
//! Speaks the store's Cypher-over-HTTP transaction endpoint
//! (`POST {uri}/db/{database}/tx/commit`) with basic auth. Each call
//! submits a single statement per transaction, so property write-back is
//! all-or-nothing at the statement level.
//!
//! Per the error-handling policy there is no internal retry: connection
//! failures surface immediately as `GraphConnection`, server-reported
//! query errors as `GraphQuery`.

use super::{GraphStore, NodeScore, PageRankOptions};
use crate::config::GraphStoreConfig;
use crate::errors::{AppError, Result};
use crate::models::{NodeId, NodeInfo, NodeLabel, ProjectedEdge, RankedNode};
use async_trait::async_trait;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

/// Valid node property names: identifier-shaped, so they can be spliced
/// into Cypher behind backticks without escaping concerns.
fn property_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

/// Reject property names that cannot be safely interpolated into Cypher
pub fn validate_property_name(name: &str) -> Result<()> {
    if property_name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(AppError::InvalidPropertyName {
            name: name.to_string(),
        })
    }
}

#[derive(Serialize)]
struct TxRequest {
    statements: Vec<TxStatement>,
}

#[derive(Serialize)]
struct TxStatement {
    statement: String,
    parameters: Value,
}

#[derive(Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Deserialize)]
struct TxResult {
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Deserialize)]
struct TxError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// GraphStore implementation over the store's HTTP transaction endpoint
pub struct HttpGraphStore {
    client: reqwest::Client,
    endpoint: String,
    user: String,
    password: String,
}

impl HttpGraphStore {
    /// Create a client from connection configuration
    pub fn new(config: &GraphStoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration {
                message: format!("Failed to create graph store client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/db/{}/tx/commit",
                config.uri.trim_end_matches('/'),
                config.database
            ),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// Submit one Cypher statement and return its rows
    async fn execute(&self, statement: &str, parameters: Value) -> Result<Vec<Vec<Value>>> {
        let request = TxRequest {
            statements: vec![TxStatement {
                statement: statement.to_string(),
                parameters,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.user, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GraphQuery {
                message: format!("Graph store returned {}: {}", status, body),
            });
        }

        let result: TxResponse = response.json().await.map_err(|e| AppError::GraphQuery {
            message: format!("Failed to parse graph store response: {}", e),
        })?;

        if let Some(err) = result.errors.first() {
            return Err(AppError::GraphQuery {
                message: format!("{}: {}", err.code, err.message),
            });
        }

        Ok(result
            .results
            .into_iter()
            .next()
            .map(|r| r.data.into_iter().map(|d| d.row).collect())
            .unwrap_or_default())
    }
}

/// Translate a store-side "graph does not exist" failure into a typed
/// not-found error for the named projection.
fn map_missing_projection(err: AppError, name: &str) -> AppError {
    match err {
        AppError::GraphQuery { ref message } if message.contains("does not exist") => {
            AppError::ProjectionNotFound {
                name: name.to_string(),
            }
        }
        other => other,
    }
}

fn row_i64(value: &Value) -> Result<i64> {
    value.as_i64().ok_or_else(|| AppError::GraphQuery {
        message: format!("Expected integer in result row, got {}", value),
    })
}

fn row_f64(value: &Value) -> Result<f64> {
    value.as_f64().ok_or_else(|| AppError::GraphQuery {
        message: format!("Expected number in result row, got {}", value),
    })
}

fn row_str(value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| AppError::GraphQuery {
            message: format!("Expected string in result row, got {}", value),
        })
}

fn row_label(value: &Value) -> Result<NodeLabel> {
    match value.as_str() {
        Some("Person") => Ok(NodeLabel::Person),
        Some("Company") => Ok(NodeLabel::Company),
        _ => Err(AppError::GraphQuery {
            message: format!("Expected node label in result row, got {}", value),
        }),
    }
}

#[async_trait]
impl GraphStore for HttpGraphStore {
    async fn create_projection(
        &self,
        name: &str,
        node_selector: &str,
        edge_selector: &str,
    ) -> Result<()> {
        self.execute(
            "CALL gds.graph.project.cypher($name, $nodeQuery, $relationshipQuery)",
            json!({
                "name": name,
                "nodeQuery": node_selector,
                "relationshipQuery": edge_selector,
            }),
        )
        .await?;
        Ok(())
    }

    async fn drop_projection(&self, name: &str) -> Result<()> {
        // failIfMissing=false: dropping an absent projection is a no-op
        self.execute(
            "CALL gds.graph.drop($name, false)",
            json!({ "name": name }),
        )
        .await?;
        Ok(())
    }

    async fn stream_edges(&self, name: &str) -> Result<Vec<ProjectedEdge>> {
        let rows = self
            .execute(
                "CALL gds.graph.relationshipProperty.stream($name, 'weight') \
                 YIELD sourceNodeId, targetNodeId, propertyValue \
                 RETURN sourceNodeId, targetNodeId, propertyValue",
                json!({ "name": name }),
            )
            .await
            .map_err(|e| map_missing_projection(e, name))?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != 3 {
                return Err(AppError::GraphQuery {
                    message: format!("Expected 3-column edge row, got {} columns", row.len()),
                });
            }
            edges.push(ProjectedEdge {
                source: row_i64(&row[0])?,
                target: row_i64(&row[1])?,
                weight: row_f64(&row[2])?,
            });
        }
        Ok(edges)
    }

    async fn run_page_rank(&self, name: &str, opts: &PageRankOptions) -> Result<Vec<NodeScore>> {
        let mut config = json!({
            "dampingFactor": opts.damping,
            "maxIterations": opts.iterations,
            "relationshipWeightProperty": "weight",
        });

        let statement = if let Some(property) = &opts.write_property {
            validate_property_name(property)?;
            config["writeProperty"] = json!(property);
            "CALL gds.pageRank.write($graph, $config) \
             YIELD nodePropertiesWritten RETURN nodePropertiesWritten"
        } else {
            "CALL gds.pageRank.stream($graph, $config) \
             YIELD nodeId, score RETURN nodeId, score"
        };

        let rows = self
            .execute(statement, json!({ "graph": name, "config": config }))
            .await
            .map_err(|e| map_missing_projection(e, name))?;

        if opts.write_property.is_some() {
            return Ok(Vec::new());
        }

        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != 2 {
                return Err(AppError::GraphQuery {
                    message: format!("Expected 2-column score row, got {} columns", row.len()),
                });
            }
            scores.push(NodeScore {
                node_id: row_i64(&row[0])?,
                score: row_f64(&row[1])?,
            });
        }
        Ok(scores)
    }

    async fn resolve_node_names(&self, ids: &[NodeId]) -> Result<HashMap<NodeId, NodeInfo>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = self
            .execute(
                "MATCH (n) WHERE id(n) IN $ids \
                 RETURN id(n) AS id, \
                        CASE \
                          WHEN 'Person' IN labels(n) THEN n.first_name + ' ' + n.last_name \
                          WHEN 'Company' IN labels(n) THEN n.name \
                          ELSE toString(id(n)) \
                        END AS name, \
                        CASE WHEN 'Person' IN labels(n) THEN 'Person' ELSE 'Company' END AS label",
                json!({ "ids": ids }),
            )
            .await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in &rows {
            if row.len() != 3 {
                return Err(AppError::GraphQuery {
                    message: format!("Expected 3-column name row, got {} columns", row.len()),
                });
            }
            names.insert(
                row_i64(&row[0])?,
                NodeInfo {
                    name: row_str(&row[1])?,
                    label: row_label(&row[2])?,
                },
            );
        }
        Ok(names)
    }

    async fn write_node_property(
        &self,
        ids: &[NodeId],
        property: &str,
        values: &[f64],
    ) -> Result<()> {
        validate_property_name(property)?;
        if ids.len() != values.len() {
            return Err(AppError::Internal {
                message: format!(
                    "Property batch mismatch: {} ids vs {} values",
                    ids.len(),
                    values.len()
                ),
            });
        }
        if ids.is_empty() {
            return Ok(());
        }

        let rows: Vec<Value> = ids
            .iter()
            .zip(values)
            .map(|(id, value)| json!({ "id": id, "value": value }))
            .collect();

        // One statement, one transaction: the batch commits or rolls back
        // as a whole.
        let statement = format!(
            "UNWIND $rows AS row MATCH (n) WHERE id(n) = row.id SET n.`{}` = row.value",
            property
        );
        self.execute(&statement, json!({ "rows": rows })).await?;
        Ok(())
    }

    async fn top_nodes_by_property(
        &self,
        property: &str,
        label: Option<NodeLabel>,
        limit: usize,
    ) -> Result<Vec<RankedNode>> {
        validate_property_name(property)?;

        let match_clause = match label {
            Some(NodeLabel::Person) => "MATCH (n:Person)",
            Some(NodeLabel::Company) => "MATCH (n:Company)",
            None => "MATCH (n)",
        };
        let statement = format!(
            "{} WHERE n.`{prop}` IS NOT NULL \
             RETURN id(n) AS id, \
                    CASE \
                      WHEN 'Person' IN labels(n) THEN n.first_name + ' ' + n.last_name \
                      WHEN 'Company' IN labels(n) THEN n.name \
                      ELSE toString(id(n)) \
                    END AS name, \
                    CASE WHEN 'Person' IN labels(n) THEN 'Person' ELSE 'Company' END AS label, \
                    n.`{prop}` AS score \
             ORDER BY score DESC, id ASC \
             LIMIT $limit",
            match_clause,
            prop = property
        );

        let rows = self
            .execute(&statement, json!({ "limit": limit }))
            .await?;

        let mut ranked = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != 4 {
                return Err(AppError::GraphQuery {
                    message: format!("Expected 4-column ranking row, got {} columns", row.len()),
                });
            }
            ranked.push(RankedNode {
                node_id: row_i64(&row[0])?,
                name: row_str(&row[1])?,
                label: row_label(&row[2])?,
                score: row_f64(&row[3])?,
            });
        }
        Ok(ranked)
    }

    async fn ping(&self) -> Result<()> {
        self.execute("RETURN 1", json!({})).await?;
        Ok(())
    }
}
