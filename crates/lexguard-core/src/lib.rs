pub mod inference;
pub mod pipeline;
pub mod report;

pub use inference::{
    build_adapters, Classifier, GeminiGenerator, HfClassifier, HfSummarizer, InferenceSettings,
    LabelScore, NoopClassifier, NoopGenerator, NoopSummarizer, Summarizer, TextGenerator,
};
pub use pipeline::{
    analyzer::Analyzer, findings::FindingRule, findings::FINDING_RULES, AnalysisResult, Category,
    CategoryGroup, KeyFinding, LegalQuestions, ParagraphUnit, RiskLevel, RiskRecord,
};
pub use report::{render_report, OutputFormat};
