mod service;

pub use service::{
    DeleteOutcome, GalleryService, IncomingImage, UploadOutcome, gallery_service,
};
