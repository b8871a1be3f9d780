use std::path::PathBuf;
use std::sync::Arc;

use crate::extraction::FieldExtractor;
use crate::intake::ImageStore;
use crate::pipeline::VerifyPipeline;

pub struct HandlerState<
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
> {
    pub pipeline: Arc<VerifyPipeline<E, S>>,

    pub upload_dir: PathBuf,
}

impl<E, S> Clone for HandlerState<E, S>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            upload_dir: self.upload_dir.clone(),
        }
    }
}

impl<E, S> HandlerState<E, S>
where
    E: FieldExtractor + Send + Sync + 'static,
    S: ImageStore + Send + Sync + 'static,
{
    pub fn new(pipeline: Arc<VerifyPipeline<E, S>>, upload_dir: PathBuf) -> Self {
        Self {
            pipeline,
            upload_dir,
        }
    }
}
