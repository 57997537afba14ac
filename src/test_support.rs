//! Deterministic stand-ins for every port, shared by the unit tests.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::ports::document_extractor::{
    DocumentExtractionError, DocumentInfo, ExtractedPages, SheetTable,
};
use crate::application::ports::embedding_provider::{
    BatchEmbeddingRequest, BatchEmbeddingResponse, EmbeddingProviderError, EmbeddingRequest,
    EmbeddingResponse,
};
use crate::application::ports::index_storage::IndexStorageError;
use crate::application::ports::language_model::LanguageModelError;
use crate::application::ports::translator::TranslatorError;
use crate::application::ports::weather_provider::WeatherProviderError;
use crate::application::ports::{
    DocumentExtractor, EmbeddingProvider, ForecastProvider, Geocoder, IndexStorage, LanguageModel,
    LoadOptions, SessionStore, SpreadsheetReader, Translator,
};
use crate::application::services::{
    Chunker, DocumentLoader, IndexConfig, KnowledgeBaseSources, Retriever, TranslationPipeline,
    VectorIndexManager, WeatherService,
};
use crate::application::use_cases::{
    AnswerQuestionUseCase, GetHistoryUseCase, SelectRegionUseCase, StartSessionUseCase,
};
use crate::domain::entities::{Coordinates, DailyForecast, VectorIndex};
use crate::domain::value_objects::Language;
use crate::infrastructure::external_services::tokenizers::WhitespaceTokenizer;
use crate::infrastructure::session::InMemorySessionStore;
use crate::presentation::http::handlers::SessionHandler;

pub const TEST_DIMENSION: usize = 256;

#[derive(Debug, Clone, Default)]
pub struct FakeWorkbook {
    sheets: Vec<(String, SheetTable)>,
    failing: HashSet<String>,
    unreadable: bool,
}

impl FakeWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn three_sheets() -> Self {
        Self::new()
            .with_sheet(
                "Cereals",
                &["Crop", "County", "Advice"],
                &[
                    &["Maize", "Nakuru", "Plant at the onset of the long rains"],
                    &["Sorghum", "Kitui", "Tolerates dry spells"],
                ],
            )
            .with_sheet(
                "Legumes",
                &["Crop", "County", "Advice"],
                &[&["Beans", "Kakamega", "Needs well drained soil"]],
            )
            .with_sheet(
                "Tubers",
                &["Crop", "County", "Advice"],
                &[&["Cassava", "Kilifi", "Plant cuttings before the short rains"]],
            )
    }

    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        let table = SheetTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        };
        self.sheets.push((name.to_string(), table));
        self
    }

    pub fn failing(mut self, sheet: &str) -> Self {
        self.failing.insert(sheet.to_string());
        self
    }
}

#[async_trait]
impl SpreadsheetReader for FakeWorkbook {
    async fn sheet_names(&self, file_path: &Path) -> Result<Vec<String>, DocumentExtractionError> {
        if self.unreadable {
            return Err(DocumentExtractionError::CorruptedFile(
                file_path.display().to_string(),
            ));
        }
        Ok(self.sheets.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn read_sheet(
        &self,
        _file_path: &Path,
        sheet_name: &str,
    ) -> Result<SheetTable, DocumentExtractionError> {
        if self.failing.contains(sheet_name) {
            return Err(DocumentExtractionError::SheetFailed {
                sheet: sheet_name.to_string(),
                reason: "malformed cells".to_string(),
            });
        }
        self.sheets
            .iter()
            .find(|(name, _)| name == sheet_name)
            .map(|(_, table)| table.clone())
            .ok_or_else(|| DocumentExtractionError::SheetFailed {
                sheet: sheet_name.to_string(),
                reason: "no such sheet".to_string(),
            })
    }
}

#[derive(Debug, Clone)]
pub struct FakePdf {
    pages: Option<Vec<String>>,
}

impl FakePdf {
    pub fn with_pages(count: usize) -> Self {
        Self {
            pages: Some(
                (1..=count)
                    .map(|n| format!("Page {} covers soil testing and fertiliser records", n))
                    .collect(),
            ),
        }
    }

    pub fn broken() -> Self {
        Self { pages: None }
    }
}

#[async_trait]
impl DocumentExtractor for FakePdf {
    async fn extract_pages(&self, file_path: &Path) -> Result<ExtractedPages, DocumentExtractionError> {
        match &self.pages {
            Some(pages) => Ok(ExtractedPages {
                pages: pages.clone(),
                info: DocumentInfo {
                    title: Some("Agro Advisory".to_string()),
                    author: None,
                },
            }),
            None => Err(DocumentExtractionError::CorruptedFile(
                file_path.display().to_string(),
            )),
        }
    }

    fn can_extract(&self, _file_path: &Path) -> bool {
        true
    }
}

/// Bag-of-words embedder: each lowercased word bumps one hashed bucket, then
/// the vector is normalized. Texts sharing words land close together.
#[derive(Debug, Default)]
pub struct HashingEmbedder;

impl HashingEmbedder {
    pub fn new() -> Self {
        Self
    }

    pub fn embed(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; TEST_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % TEST_DIMENSION as u64) as usize] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn generate_embedding(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, EmbeddingProviderError> {
        Ok(EmbeddingResponse {
            embedding: Self::embed(&request.text),
        })
    }

    async fn generate_embeddings(
        &self,
        request: BatchEmbeddingRequest,
    ) -> Result<BatchEmbeddingResponse, EmbeddingProviderError> {
        Ok(BatchEmbeddingResponse {
            embeddings: request.texts.iter().map(|t| Self::embed(t)).collect(),
        })
    }

    fn model_info(&self) -> (String, Option<String>) {
        ("hashing-test".to_string(), None)
    }
}

/// Returns the prompt unchanged.
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn invoke(&self, prompt: &str) -> Result<String, LanguageModelError> {
        Ok(prompt.to_string())
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn invoke(&self, _prompt: &str) -> Result<String, LanguageModelError> {
        Err(LanguageModelError::NetworkError("timed out".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}

/// Tags text with its provider and direction and counts calls.
pub struct RecordingTranslator {
    name: String,
    fail: bool,
    calls: AtomicUsize,
}

impl RecordingTranslator {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for RecordingTranslator {
    async fn translate(
        &self,
        text: &str,
        from: Language,
        to: Language,
    ) -> Result<String, TranslatorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranslatorError::ApiError {
                status: 503,
                body: "model loading".to_string(),
            });
        }
        Ok(format!("[{} {}->{}] {}", self.name, from, to, text))
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

/// Keeps the saved index in memory and honours the load opt-in.
#[derive(Default)]
pub struct InMemoryIndexStorage {
    stored: Mutex<Option<VectorIndex>>,
    saves: AtomicUsize,
}

impl InMemoryIndexStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexStorage for InMemoryIndexStorage {
    async fn exists(&self) -> bool {
        self.stored.lock().unwrap().is_some()
    }

    async fn save(&self, index: &VectorIndex) -> Result<(), IndexStorageError> {
        *self.stored.lock().unwrap() = Some(index.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load(&self, options: LoadOptions) -> Result<VectorIndex, IndexStorageError> {
        if !options.allow_dangerous_deserialization {
            return Err(IndexStorageError::UntrustedLoadRefused(self.location()));
        }
        self.stored
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| IndexStorageError::NotFound(self.location()))
    }

    fn location(&self) -> String {
        "memory://index".to_string()
    }
}

pub fn sixteen_day_forecast() -> DailyForecast {
    DailyForecast {
        dates: (1..=16).map(|d| format!("2024-03-{:02}", d)).collect(),
        temperature_max: Some(vec![Some(25.0); 16]),
        temperature_min: Some(vec![Some(15.0); 16]),
        precipitation_sum: Some(vec![Some(3.0); 16]),
        wind_speed_max: Some(vec![Some(10.0); 16]),
    }
}

/// Geocoder and forecast provider over a fixed table of regions.
#[derive(Debug, Clone)]
pub struct FakeWeather {
    regions: HashMap<String, Coordinates>,
    forecast: Option<DailyForecast>,
}

impl FakeWeather {
    pub fn nairobi() -> Self {
        let mut regions = HashMap::new();
        regions.insert(
            "nairobi".to_string(),
            Coordinates {
                latitude: -1.2833,
                longitude: 36.8167,
                resolved_name: Some("Nairobi".to_string()),
                country: Some("Kenya".to_string()),
            },
        );
        Self {
            regions,
            forecast: Some(sixteen_day_forecast()),
        }
    }

    pub fn unavailable(mut self) -> Self {
        self.forecast = None;
        self
    }
}

#[async_trait]
impl Geocoder for FakeWeather {
    async fn resolve(&self, region_name: &str) -> Result<Coordinates, WeatherProviderError> {
        self.regions
            .get(&region_name.to_lowercase())
            .cloned()
            .ok_or_else(|| WeatherProviderError::LocationNotFound(region_name.to_string()))
    }
}

#[async_trait]
impl ForecastProvider for FakeWeather {
    async fn fetch_daily(
        &self,
        _latitude: f64,
        _longitude: f64,
        _days: usize,
    ) -> Result<DailyForecast, WeatherProviderError> {
        self.forecast.clone().ok_or(WeatherProviderError::BadStatus(503))
    }
}

pub fn retriever_with(
    workbook: FakeWorkbook,
    pdf: FakePdf,
    storage: Arc<InMemoryIndexStorage>,
) -> Retriever {
    let loader = DocumentLoader::new(Arc::new(workbook), Arc::new(pdf));
    let chunker = Chunker::new(Arc::new(WhitespaceTokenizer::new()), 50, 5).unwrap();
    let index_manager = Arc::new(VectorIndexManager::new(
        Arc::new(HashingEmbedder::new()),
        storage,
        IndexConfig {
            dimension: TEST_DIMENSION,
            batch_size: 8,
            load_options: LoadOptions {
                allow_dangerous_deserialization: true,
            },
            ..IndexConfig::default()
        },
    ));
    let sources = KnowledgeBaseSources {
        workbook_path: PathBuf::from("kb.xlsx"),
        document_path: PathBuf::from("advisory.pdf"),
    };

    Retriever::new(loader, chunker, index_manager, sources)
}

pub async fn initialized_retriever() -> Arc<Retriever> {
    let retriever = retriever_with(
        FakeWorkbook::three_sheets(),
        FakePdf::with_pages(3),
        Arc::new(InMemoryIndexStorage::new()),
    );
    retriever.retrieve().await.unwrap();
    Arc::new(retriever)
}

/// Session handler over fakes, with an uninitialized knowledge base.
pub fn session_handler() -> Arc<SessionHandler> {
    let retriever = Arc::new(retriever_with(
        FakeWorkbook::three_sheets(),
        FakePdf::with_pages(3),
        Arc::new(InMemoryIndexStorage::new()),
    ));
    let weather = FakeWeather::nairobi();
    let weather_service = Arc::new(WeatherService::new(
        Arc::new(weather.clone()),
        Arc::new(weather),
        16,
    ));
    let translation = Arc::new(TranslationPipeline::new(
        Arc::new(RecordingTranslator::new("inbound")),
        Arc::new(RecordingTranslator::new("outbound")),
    ));
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    Arc::new(SessionHandler::new(
        Arc::new(StartSessionUseCase::new(retriever.clone(), sessions.clone())),
        Arc::new(SelectRegionUseCase::new(
            retriever,
            weather_service,
            Arc::new(EchoModel),
            sessions.clone(),
        )),
        Arc::new(AnswerQuestionUseCase::new(translation, sessions.clone())),
        Arc::new(GetHistoryUseCase::new(sessions)),
    ))
}
