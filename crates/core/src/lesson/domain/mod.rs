pub mod lesson;
pub mod segment;
pub mod segmentation_service;
