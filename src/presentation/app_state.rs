// Application state for HTTP handlers
use crate::application::conversion_service::ImageConversionService;
use crate::application::dashboard_service::CallDashboardService;
use crate::application::text_analysis_service::TextAnalysisService;

/// Which of the two API services is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceVariant {
    Conversion,
    TextAnalysis,
}

#[derive(Clone)]
pub struct ApiState {
    pub conversion_service: ImageConversionService,
    pub text_service: Option<TextAnalysisService>,
}

impl ApiState {
    pub fn conversion_only() -> Self {
        Self {
            conversion_service: ImageConversionService::new(),
            text_service: None,
        }
    }

    pub fn with_text_analysis(text_service: TextAnalysisService) -> Self {
        Self {
            conversion_service: ImageConversionService::new(),
            text_service: Some(text_service),
        }
    }

    pub fn variant(&self) -> ServiceVariant {
        if self.text_service.is_some() {
            ServiceVariant::TextAnalysis
        } else {
            ServiceVariant::Conversion
        }
    }
}

#[derive(Clone)]
pub struct DashboardState {
    pub dashboard_service: CallDashboardService,
}
