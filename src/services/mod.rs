pub mod exam_service;
pub mod export_service;
pub mod question_service;
pub mod storage_service;
pub mod subject_service;
