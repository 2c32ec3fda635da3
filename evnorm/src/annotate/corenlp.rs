use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::annotate::{chunk_labels, AnnotatedSentence, Annotate, AnnotateError, Annotation};
use crate::instance::Dependency;

const ANNOTATORS: &str = "tokenize,ssplit,pos,lemma,ner,parse";

/// Client for a Stanford CoreNLP server.
///
/// Requests are sent without a timeout, since parsing long documents
/// can take a long time.
pub struct CoreNlpClient {
    client: Client,
    url: String,
}

impl CoreNlpClient {
    /// Construct a client for the CoreNLP server at `url`.
    pub fn new(url: impl Into<String>) -> Result<Self, AnnotateError> {
        let client = Client::builder().timeout(None::<Duration>).build()?;

        Ok(CoreNlpClient {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn request(&self, body: String, pretokenized: bool) -> Result<Document, AnnotateError> {
        let mut properties = json!({
            "annotators": ANNOTATORS,
            "outputFormat": "json",
        });
        if pretokenized {
            properties["tokenize.whitespace"] = json!("true");
            properties["ssplit.eolonly"] = json!("true");
        }

        log::trace!("Sending {} bytes to {}", body.len(), self.url);

        let response = self
            .client
            .post(&self.url)
            .query(&[("properties", properties.to_string())])
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnnotateError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(response.json()?)
    }
}

impl Annotate for CoreNlpClient {
    fn annotate(&self, text: &str) -> Result<Annotation, AnnotateError> {
        if text.trim().is_empty() {
            return Err(AnnotateError::EmptyText);
        }

        self.request(text.to_owned(), false)?.into_annotation(None)
    }

    fn annotate_sentences(&self, sentences: &[Vec<String>]) -> Result<Annotation, AnnotateError> {
        if sentences.iter().all(Vec::is_empty) {
            return Err(AnnotateError::EmptyText);
        }

        let body = sentences
            .iter()
            .map(|sentence| sentence.join(" "))
            .collect::<Vec<_>>()
            .join("\n");

        self.request(body, true)?.into_annotation(Some(sentences))
    }
}

#[derive(Debug, Deserialize)]
struct Document {
    sentences: Vec<SentenceAnnotation>,
}

impl Document {
    /// Convert the server response to an annotation.
    ///
    /// When the input was pre-tokenized, the response is checked
    /// against the input sentences.
    fn into_annotation(self, input: Option<&[Vec<String>]>) -> Result<Annotation, AnnotateError> {
        if let Some(input) = input {
            if input.len() != self.sentences.len() {
                return Err(AnnotateError::Inconsistent(format!(
                    "{} sentences were sent, {} were annotated",
                    input.len(),
                    self.sentences.len()
                )));
            }
        }

        let mut annotation = Annotation::default();
        for (idx, sentence) in self.sentences.into_iter().enumerate() {
            let chunks = chunk_labels(&sentence.parse)?;

            let sentence = AnnotatedSentence {
                tokens: sentence.tokens.iter().map(|t| t.word.clone()).collect(),
                lemmas: sentence.tokens.iter().map(|t| t.lemma.clone()).collect(),
                pos: sentence.tokens.iter().map(|t| t.pos.clone()).collect(),
                ner: sentence.tokens.iter().map(|t| t.ner.clone()).collect(),
                constituency: sentence.parse,
                dependencies: sentence
                    .basic_dependencies
                    .into_iter()
                    .map(|dep| Dependency {
                        relation: dep.dep,
                        head: dep.governor,
                        dependent: dep.dependent,
                    })
                    .collect(),
                chunks,
            };

            if let Some(input) = input {
                if input[idx].len() != sentence.tokens.len() {
                    return Err(AnnotateError::Inconsistent(format!(
                        "sentence {} has {} tokens, {} were annotated",
                        idx,
                        input[idx].len(),
                        sentence.tokens.len()
                    )));
                }
            }

            annotation.push_sentence(sentence)?;
        }

        Ok(annotation)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SentenceAnnotation {
    parse: String,
    basic_dependencies: Vec<DependencyAnnotation>,
    tokens: Vec<TokenAnnotation>,
}

#[derive(Debug, Deserialize)]
struct DependencyAnnotation {
    dep: String,
    governor: usize,
    dependent: usize,
}

#[derive(Debug, Deserialize)]
struct TokenAnnotation {
    word: String,
    lemma: String,
    pos: String,
    ner: String,
}
