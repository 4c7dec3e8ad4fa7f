pub mod upload_worker;
