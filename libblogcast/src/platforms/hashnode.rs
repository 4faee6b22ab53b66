//! Hashnode platform implementation
//!
//! Publishing is a two-step GraphQL exchange against one endpoint:
//!
//! 1. a discovery query that finds the account's publication id
//! 2. a create-story mutation into that publication
//!
//! Title, body and publication id always travel as GraphQL variables. The
//! query text is a constant, so markdown full of quotes or `"""` cannot
//! change its syntax.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AuthScheme, HashnodeApi, HashnodeConfig};
use crate::error::{PlatformError, Result};
use crate::platforms::{http, Platform};
use crate::types::{Document, PlatformKind, PublishReceipt};

const LEGACY_DISCOVERY_QUERY: &str = r#"
query Publication {
  me {
    publication {
      _id
      title
    }
  }
}
"#;

const PUBLICATIONS_DISCOVERY_QUERY: &str = r#"
query Publications {
  me {
    publications(first: 10) {
      edges {
        node {
          id
          title
        }
      }
    }
  }
}
"#;

const LEGACY_CREATE_STORY_MUTATION: &str = r#"
mutation CreateStory($title: String!, $contentMarkdown: String!, $publicationId: String!, $isPartOfPublication: Boolean!) {
  createStory(input: {
    title: $title,
    contentMarkdown: $contentMarkdown,
    publicationId: $publicationId,
    isPartOfPublication: $isPartOfPublication
  }) {
    post {
      slug
      title
    }
  }
}
"#;

const PUBLICATION_STORY_MUTATION: &str = r#"
mutation CreatePublicationStory($title: String!, $contentMarkdown: String!, $publicationId: ObjectId!, $isPartOfPublication: Boolean!) {
  createPublicationStory(input: {
    title: $title,
    contentMarkdown: $contentMarkdown,
    publicationId: $publicationId,
    isPartOfPublication: $isPartOfPublication
  }) {
    post {
      slug
      title
    }
  }
}
"#;

/// Request body for a GraphQL call
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<V: Serialize> {
    pub query: &'static str,
    pub variables: V,
}

/// Variables bound into the create-story mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryVariables {
    pub title: String,
    pub content_markdown: String,
    pub publication_id: String,
    pub is_part_of_publication: bool,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<serde_json::Value>,
}

impl GraphQlError {
    fn is_unauthenticated(&self) -> bool {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(|code| code.as_str())
            .is_some_and(|code| code == "UNAUTHENTICATED" || code == "FORBIDDEN")
    }
}

#[derive(Debug, Deserialize)]
struct LegacyDiscovery {
    me: Option<LegacyMe>,
}

#[derive(Debug, Deserialize)]
struct LegacyMe {
    publication: Option<LegacyPublication>,
}

#[derive(Debug, Deserialize)]
struct LegacyPublication {
    #[serde(rename = "_id")]
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PublicationsDiscovery {
    me: Option<PublicationsMe>,
}

#[derive(Debug, Deserialize)]
struct PublicationsMe {
    publications: Option<PublicationConnection>,
}

#[derive(Debug, Deserialize)]
struct PublicationConnection {
    #[serde(default)]
    edges: Vec<PublicationEdge>,
}

#[derive(Debug, Deserialize)]
struct PublicationEdge {
    node: PublicationNode,
}

#[derive(Debug, Deserialize)]
struct PublicationNode {
    id: Option<String>,
}

/// Hashnode GraphQL client
pub struct HashnodeClient {
    client: reqwest::Client,
    endpoint: String,
    api: HashnodeApi,
    auth_scheme: AuthScheme,
    token: SecretString,
}

impl HashnodeClient {
    pub fn new(config: &HashnodeConfig, token: SecretString, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http::build_client(timeout)?,
            endpoint: format!("{}/", http::normalize_base_url(&config.base_url)),
            api: config.api,
            auth_scheme: config.auth_scheme,
            token,
        })
    }

    fn authorization(&self) -> String {
        self.auth_scheme.header_value(self.token.expose_secret())
    }

    /// Build the create-story request for a document and publication
    pub fn create_story_request(
        api: HashnodeApi,
        document: &Document,
        publication_id: &str,
    ) -> GraphQlRequest<CreateStoryVariables> {
        let query = match api {
            HashnodeApi::Legacy => LEGACY_CREATE_STORY_MUTATION,
            HashnodeApi::Publications => PUBLICATION_STORY_MUTATION,
        };

        GraphQlRequest {
            query,
            variables: CreateStoryVariables {
                title: document.title().to_string(),
                content_markdown: document.body_without_title().to_string(),
                publication_id: publication_id.to_string(),
                is_part_of_publication: true,
            },
        }
    }

    async fn execute<V: Serialize, T: DeserializeOwned>(
        &self,
        context: &str,
        request: &GraphQlRequest<V>,
    ) -> Result<T> {
        let builder = self
            .client
            .post(&self.endpoint)
            .header("Authorization", self.authorization())
            .json(request);

        let response = http::send(self.kind(), context, builder).await?;
        let body: GraphQlResponse<T> = http::read_json(self.kind(), context, response).await?;

        if !body.errors.is_empty() {
            let messages = body
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");

            let error = if body.errors.iter().any(GraphQlError::is_unauthenticated) {
                PlatformError::Authentication(format!(
                    "Hashnode rejected the credential during {}: {}",
                    context, messages
                ))
            } else {
                PlatformError::Posting(format!("Hashnode {} failed: {}", context, messages))
            };
            return Err(error.into());
        }

        body.data.ok_or_else(|| {
            PlatformError::Posting(format!("Hashnode {} returned no data", context)).into()
        })
    }

    /// Find the publication to post into
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Discovery` when the account has no publication.
    pub async fn discover_publication(&self) -> Result<String> {
        let no_publication =
            || PlatformError::Discovery("No publication found for the Hashnode account".to_string());

        let id = match self.api {
            HashnodeApi::Legacy => {
                let request = GraphQlRequest {
                    query: LEGACY_DISCOVERY_QUERY,
                    variables: serde_json::json!({}),
                };
                let data: LegacyDiscovery = self.execute("publication discovery", &request).await?;
                data.me
                    .and_then(|me| me.publication)
                    .and_then(|publication| publication.id)
            }
            HashnodeApi::Publications => {
                let request = GraphQlRequest {
                    query: PUBLICATIONS_DISCOVERY_QUERY,
                    variables: serde_json::json!({}),
                };
                let data: PublicationsDiscovery =
                    self.execute("publication discovery", &request).await?;
                data.me
                    .and_then(|me| me.publications)
                    .and_then(|connection| connection.edges.into_iter().next())
                    .and_then(|edge| edge.node.id)
            }
        };

        match id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(no_publication().into()),
        }
    }
}

#[async_trait]
impl Platform for HashnodeClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Hashnode
    }

    async fn publish(&self, document: &Document) -> Result<PublishReceipt> {
        let publication_id = self.discover_publication().await?;
        debug!("Publishing into Hashnode publication {}", publication_id);

        let request = Self::create_story_request(self.api, document, &publication_id);
        let data: serde_json::Value = self.execute("story creation", &request).await?;

        let field = match self.api {
            HashnodeApi::Legacy => "createStory",
            HashnodeApi::Publications => "createPublicationStory",
        };
        let slug = data
            .get(field)
            .and_then(|story| story.pointer("/post/slug"))
            .and_then(|slug| slug.as_str())
            .map(str::to_string);

        Ok(PublishReceipt {
            post_id: None,
            slug,
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRICKY: &str = "# Say \"hi\"\n\nA block: \"\"\"quoted\"\"\" and a } brace.\n";

    /// The old way: splice values straight into the query text
    fn interpolated_mutation(title: &str, body: &str, publication_id: &str) -> String {
        format!(
            "mutation {{ createStory(input: {{ title: \"{}\", contentMarkdown: \"\"\"{}\"\"\", publicationId: \"{}\", isPartOfPublication: true }}) {{ post {{ slug }} }} }}",
            title, body, publication_id
        )
    }

    #[test]
    fn test_bound_variables_carry_special_characters_intact() {
        let document = Document::parse(TRICKY).unwrap();

        for api in [HashnodeApi::Legacy, HashnodeApi::Publications] {
            let request = HashnodeClient::create_story_request(api, &document, "pub-1");

            // Query text never depends on the content
            assert!(!request.query.contains("quoted"));
            assert_eq!(request.query.matches('"').count(), 0);

            let wire = serde_json::to_string(&request).unwrap();
            let decoded: serde_json::Value = serde_json::from_str(&wire).unwrap();
            let variables: CreateStoryVariables =
                serde_json::from_value(decoded["variables"].clone()).unwrap();

            assert_eq!(variables.title, "Say \"hi\"");
            assert_eq!(
                variables.content_markdown,
                "\nA block: \"\"\"quoted\"\"\" and a } brace.\n"
            );
            assert_eq!(variables.publication_id, "pub-1");
            assert!(variables.is_part_of_publication);
        }
    }

    #[test]
    fn test_interpolation_corrupts_query() {
        let document = Document::parse(TRICKY).unwrap();
        let query =
            interpolated_mutation(document.title(), document.body_without_title(), "pub-1");

        // The body's own """ closes the block string early, leaving unbalanced delimiters
        assert_ne!(query.matches("\"\"\"").count(), 2);
        // And the title's quotes end the title string mid-way
        assert!(query.contains("title: \"Say \"hi\"\""));
    }

    #[test]
    fn test_create_story_mutation_per_api() {
        let document = Document::parse("# T\nbody").unwrap();

        let legacy = HashnodeClient::create_story_request(HashnodeApi::Legacy, &document, "x");
        assert!(legacy.query.contains("createStory("));

        let current =
            HashnodeClient::create_story_request(HashnodeApi::Publications, &document, "x");
        assert!(current.query.contains("createPublicationStory("));
        assert!(current.query.contains("$publicationId: ObjectId!"));
    }

    #[test]
    fn test_authorization_header_scheme() {
        let mut config = HashnodeConfig::default();
        let token = || SecretString::from("hn-token".to_string());

        let bare = HashnodeClient::new(&config, token(), Duration::from_secs(5)).unwrap();
        assert_eq!(bare.authorization(), "hn-token");

        config.auth_scheme = AuthScheme::Bearer;
        let bearer = HashnodeClient::new(&config, token(), Duration::from_secs(5)).unwrap();
        assert_eq!(bearer.authorization(), "Bearer hn-token");
    }

    #[test]
    fn test_endpoint_has_trailing_slash() {
        let client = HashnodeClient::new(
            &HashnodeConfig::default(),
            SecretString::from("t".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.endpoint, "https://gql.hashnode.com/");
    }
}
