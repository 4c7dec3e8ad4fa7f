pub mod http_segmentation_client;
pub mod lesson_file;
