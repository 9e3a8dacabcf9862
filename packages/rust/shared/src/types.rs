//! Core domain types for articleflow work items.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ArticleflowError;

// ---------------------------------------------------------------------------
// ArticleId
// ---------------------------------------------------------------------------

/// Store-assigned article identifier. Never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub i64);

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ArticleId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// Processing stage of an article. Ordered: each variant follows the previous.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Waiting for reference discovery.
    #[default]
    Pending,
    /// Two citation links are stored.
    Searched,
    /// Reference excerpts are stored.
    Scraped,
    /// Rewritten content is stored. Terminal.
    Completed,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 4] = [
        Stage::Pending,
        Stage::Searched,
        Stage::Scraped,
        Stage::Completed,
    ];

    /// Wire/storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Searched => "searched",
            Self::Scraped => "scraped",
            Self::Completed => "completed",
        }
    }

    /// The stage that directly follows this one, if any.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Pending => Some(Self::Searched),
            Self::Searched => Some(Self::Scraped),
            Self::Scraped => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = ArticleflowError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "searched" => Ok(Self::Searched),
            "scraped" => Ok(Self::Scraped),
            "completed" => Ok(Self::Completed),
            other => Err(ArticleflowError::validation(format!(
                "unknown processing stage '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A single work item as stored by the article store.
///
/// Field names on the wire follow the REST backend (`processing_stage`,
/// `ref1_content`, `ref2_content`). Nullable columns read as their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub original_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citation_links: Vec<String>,
    #[serde(default, rename = "ref1_content")]
    pub first_excerpt: Option<String>,
    #[serde(default, rename = "ref2_content")]
    pub second_excerpt: Option<String>,
    #[serde(default)]
    pub updated_content: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_updated: bool,
    #[serde(default, rename = "processing_stage", deserialize_with = "null_as_default")]
    pub stage: Stage,
}

impl Article {
    /// A fresh `pending` article, as an external producer would create it.
    pub fn new(id: ArticleId, title: impl Into<String>, original_content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            original_content: original_content.into(),
            original_url: None,
            citation_links: Vec::new(),
            first_excerpt: None,
            second_excerpt: None,
            updated_content: None,
            is_updated: false,
            stage: Stage::Pending,
        }
    }

    /// Both reference excerpts, empty when not scraped.
    pub fn excerpts(&self) -> [&str; 2] {
        [
            self.first_excerpt.as_deref().unwrap_or_default(),
            self.second_excerpt.as_deref().unwrap_or_default(),
        ]
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// ArticleUpdate
// ---------------------------------------------------------------------------

/// A partial update, persisted by the store as a single write.
///
/// Every stage transition is expressed as one `ArticleUpdate` carrying both
/// the new stage and the data that stage produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_links: Option<Vec<String>>,
    #[serde(rename = "ref1_content", skip_serializing_if = "Option::is_none")]
    pub first_excerpt: Option<String>,
    #[serde(rename = "ref2_content", skip_serializing_if = "Option::is_none")]
    pub second_excerpt: Option<String>,
    /// `Some(None)` clears a stored rewrite; serialized as `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_updated: Option<bool>,
    #[serde(rename = "processing_stage", skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
}

impl ArticleUpdate {
    /// `pending → searched`: store the discovered citation links.
    pub fn searched(citation_links: Vec<String>) -> Self {
        Self {
            citation_links: Some(citation_links),
            stage: Some(Stage::Searched),
            ..Default::default()
        }
    }

    /// `searched → scraped`: store both reference excerpts.
    pub fn scraped(first_excerpt: String, second_excerpt: String) -> Self {
        Self {
            first_excerpt: Some(first_excerpt),
            second_excerpt: Some(second_excerpt),
            stage: Some(Stage::Scraped),
            ..Default::default()
        }
    }

    /// `scraped → completed`: store the final document.
    pub fn completed(updated_content: String) -> Self {
        Self {
            updated_content: Some(Some(updated_content)),
            is_updated: Some(true),
            stage: Some(Stage::Completed),
            ..Default::default()
        }
    }

    /// Also reset the rewritten document, so a forced re-run that stops
    /// before `completed` does not leave the previous result behind.
    pub fn clearing_rewrite(mut self) -> Self {
        self.updated_content = Some(None);
        self.is_updated = Some(false);
        self
    }

    /// Apply the present fields to an in-memory article.
    pub fn apply_to(&self, article: &mut Article) {
        if let Some(links) = &self.citation_links {
            article.citation_links = links.clone();
        }
        if let Some(text) = &self.first_excerpt {
            article.first_excerpt = Some(text.clone());
        }
        if let Some(text) = &self.second_excerpt {
            article.second_excerpt = Some(text.clone());
        }
        if let Some(content) = &self.updated_content {
            article.updated_content = content.clone();
        }
        if let Some(flag) = self.is_updated {
            article.is_updated = flag;
        }
        if let Some(stage) = self.stage {
            article.stage = stage;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_order_is_pipeline_order() {
        assert!(Stage::Pending < Stage::Searched);
        assert!(Stage::Searched < Stage::Scraped);
        assert!(Stage::Scraped < Stage::Completed);
        let mut walked = vec![Stage::Pending];
        while let Some(next) = walked.last().and_then(Stage::next) {
            walked.push(next);
        }
        assert_eq!(walked, Stage::ALL);
    }

    #[test]
    fn stage_parse_and_display() {
        for stage in Stage::ALL {
            let parsed: Stage = stage.to_string().parse().expect("parse stage");
            assert_eq!(parsed, stage);
        }
        assert!("done".parse::<Stage>().is_err());
    }

    #[test]
    fn article_from_rest_payload() {
        let json = r#"{
            "id": 7,
            "title": "Chatbots for clinics",
            "original_content": "Body",
            "original_url": "https://blog.example.com/chatbots",
            "citation_links": null,
            "updated_content": null,
            "is_updated": false,
            "processing_stage": null,
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let article: Article = serde_json::from_str(json).expect("deserialize");
        assert_eq!(article.id, ArticleId(7));
        assert_eq!(article.stage, Stage::Pending);
        assert!(article.citation_links.is_empty());
        assert_eq!(article.excerpts(), ["", ""]);
    }

    #[test]
    fn article_reads_wire_names() {
        let json = r#"{
            "id": 3,
            "title": "T",
            "citation_links": ["https://a.com/x", "https://b.com/y"],
            "ref1_content": "first",
            "ref2_content": "second",
            "processing_stage": "scraped"
        }"#;
        let article: Article = serde_json::from_str(json).expect("deserialize");
        assert_eq!(article.stage, Stage::Scraped);
        assert_eq!(article.excerpts(), ["first", "second"]);
        assert_eq!(article.original_content, "");
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = ArticleUpdate::searched(vec!["https://a.com/x".into(), "https://b.com/y".into()]);
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "citation_links": ["https://a.com/x", "https://b.com/y"],
                "processing_stage": "searched"
            })
        );

        let json = serde_json::to_value(ArticleUpdate::completed("done".into())).unwrap();
        assert_eq!(json["is_updated"], true);
        assert_eq!(json["processing_stage"], "completed");
        assert!(json.get("ref1_content").is_none());
    }

    #[test]
    fn update_apply_to_article() {
        let mut article = Article::new(ArticleId(1), "T", "Body");
        ArticleUpdate::scraped("one".into(), "two".into()).apply_to(&mut article);
        assert_eq!(article.stage, Stage::Scraped);
        assert_eq!(article.excerpts(), ["one", "two"]);
        assert!(article.updated_content.is_none());
        assert!(!article.is_updated);
    }

    #[test]
    fn clearing_rewrite_sends_explicit_nulls() {
        let update = ArticleUpdate::searched(vec!["https://a.com/x".into()]).clearing_rewrite();
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["updated_content"], serde_json::Value::Null);
        assert!(json.as_object().unwrap().contains_key("updated_content"));
        assert_eq!(json["is_updated"], false);
        assert_eq!(json["processing_stage"], "searched");

        let mut article = Article::new(ArticleId(1), "T", "Body");
        ArticleUpdate::completed("rewritten".into()).apply_to(&mut article);
        assert!(article.is_updated);
        update.apply_to(&mut article);
        assert_eq!(article.stage, Stage::Searched);
        assert!(article.updated_content.is_none());
        assert!(!article.is_updated);
    }
}
