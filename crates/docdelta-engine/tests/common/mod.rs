//! Scripted collaborators for engine tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use docdelta_core::ai::{
    AIADocumentChangePayload, AIADocumentChangesAnalysisResponse,
    AIADocumentChangesTaggingResponse, AiServiceResponse, TaggedChangeReference,
};
use docdelta_core::model::DocumentSource;
use docdelta_core::AiOperationType;
use docdelta_core_types::Sensitive;
use docdelta_engine::{
    AiTextService, CollaboratorError, CollaboratorResult, Comparator, DocumentHandle,
    DocumentOpener, EngineSettings, PlainTextBackend,
};

/// Plain-text opener that fails for scripted sources and counts opens
pub struct ScriptedOpener {
    inner: PlainTextBackend,
    failures: Vec<(Vec<u8>, CollaboratorError)>,
    opened: AtomicUsize,
}

impl ScriptedOpener {
    pub fn new() -> Self {
        Self {
            inner: PlainTextBackend::default(),
            failures: Vec::new(),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, bytes: &[u8], err: CollaboratorError) -> Self {
        self.failures.push((bytes.to_vec(), err));
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentOpener for ScriptedOpener {
    async fn open(
        &self,
        source: &DocumentSource,
        password: Option<&Sensitive<String>>,
    ) -> CollaboratorResult<Arc<dyn DocumentHandle>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        if let DocumentSource::Bytes(bytes) = source {
            if let Some((_, err)) = self.failures.iter().find(|(b, _)| b == bytes) {
                return Err(err.clone());
            }
        }
        self.inner.open(source, password).await
    }
}

/// How the scripted AI service answers one call
#[derive(Debug, Clone)]
pub enum Script {
    Analysis { summary: String, categories: Vec<String> },
    /// Tag every submitted change with these tags
    TagAll(Vec<String>),
    Tagging(Vec<TaggedChangeReference>),
    Fail(CollaboratorError),
    /// Answer with the inner script after a delay
    After(Duration, Box<Script>),
    /// Never answer
    Hang,
}

/// One recorded service call
#[derive(Debug, Clone)]
pub struct Call {
    pub operation_type: AiOperationType,
    pub categories: Vec<String>,
    pub changes: Vec<AIADocumentChangePayload>,
}

pub struct ScriptedAi {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedAi {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiTextService for ScriptedAi {
    async fn submit(
        &self,
        changes: &[AIADocumentChangePayload],
        operation_type: AiOperationType,
        categories: &[String],
    ) -> CollaboratorResult<AiServiceResponse> {
        self.calls.lock().unwrap().push(Call {
            operation_type,
            categories: categories.to_vec(),
            changes: changes.to_vec(),
        });
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted AI call");
        play(script, changes).await
    }
}

async fn play(
    mut script: Script,
    changes: &[AIADocumentChangePayload],
) -> CollaboratorResult<AiServiceResponse> {
    loop {
        return match script {
            Script::Analysis {
                summary,
                categories,
            } => Ok(AiServiceResponse::Analysis(
                AIADocumentChangesAnalysisResponse {
                    summary,
                    categories,
                },
            )),
            Script::TagAll(tags) => Ok(AiServiceResponse::Tagging(
                AIADocumentChangesTaggingResponse {
                    references: changes
                        .iter()
                        .map(|c| TaggedChangeReference {
                            id: c.id.clone(),
                            tag: tags.clone(),
                        })
                        .collect(),
                },
            )),
            Script::Tagging(references) => Ok(AiServiceResponse::Tagging(
                AIADocumentChangesTaggingResponse { references },
            )),
            Script::Fail(err) => Err(err),
            Script::After(delay, inner) => {
                tokio::time::sleep(delay).await;
                script = *inner;
                continue;
            }
            Script::Hang => std::future::pending().await,
        };
    }
}

pub fn bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Plain-text comparator with the given opener and optional AI service
pub fn comparator(
    opener: Arc<ScriptedOpener>,
    ai: Option<Arc<ScriptedAi>>,
    settings: EngineSettings,
) -> Comparator {
    let comparator = Comparator::new(opener, Arc::new(PlainTextBackend::new(settings.plain_text)))
        .with_settings(settings);
    match ai {
        Some(ai) => comparator.with_ai_service(ai),
        None => comparator,
    }
}
