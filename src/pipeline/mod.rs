//! Ordered composition of compression transforms.
//!
//! A [`Pipeline`] is a sequence of [`Transform`] stages applied left to right:
//! each stage consumes the buffer produced by the previous one. An empty
//! pipeline is the identity. Stage lists are built once at startup (from
//! configuration or code) and shared read-only by every file in a batch.

pub mod guard;
pub mod transforms;

use log::debug;

use crate::buffer::ImageBuffer;
use crate::error::{Error, Result};

pub use guard::{Guarded, keep_smaller};
pub use transforms::{StageSpec, build_stage};

/// A single compression stage.
pub trait Transform: Send + Sync {
    /// Stage name used in logs and errors.
    fn name(&self) -> &str;

    /// Produce a replacement buffer for `input`.
    fn apply(&self, input: &ImageBuffer) -> Result<ImageBuffer>;
}

/// Closure-backed transform callback type.
pub type TransformFn = Box<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// Adapter turning a byte-level callback into a [`Transform`].
pub struct FnTransform {
    name: String,
    f: TransformFn,
}

impl FnTransform {
    /// Wrap a callback under the given stage name.
    pub fn new(name: impl Into<String>, f: TransformFn) -> Self {
        Self { name: name.into(), f }
    }
}

impl Transform for FnTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, input: &ImageBuffer) -> Result<ImageBuffer> {
        (self.f)(input.as_bytes()).map(ImageBuffer::new)
    }
}

/// Ordered list of transforms applied as one.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// Create an empty (identity) pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from stage specs.
    pub fn from_specs(specs: &[StageSpec]) -> Result<Self> {
        let mut pipeline = Self::new();
        for spec in specs {
            pipeline.push(build_stage(spec)?);
        }
        Ok(pipeline)
    }

    /// Append a stage.
    pub fn push(&mut self, stage: Box<dyn Transform>) -> &mut Self {
        self.stages.push(stage);
        self
    }

    /// Append a closure stage.
    pub fn push_fn(&mut self, name: &str, f: TransformFn) -> &mut Self {
        self.push(Box::new(FnTransform::new(name, f)))
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether this is the identity pipeline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of the stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run `input` through every stage in order.
    ///
    /// Stops at the first failing stage; later stages are not applied.
    pub fn apply(&self, input: &ImageBuffer) -> Result<ImageBuffer> {
        let mut current = input.clone();

        for (index, stage) in self.stages.iter().enumerate() {
            let before = current.len();
            current = stage.apply(&current).map_err(|e| Error::Transform {
                index,
                stage: stage.name().to_string(),
                message: match e {
                    Error::Transform { message, .. } => message,
                    other => other.to_string(),
                },
            })?;
            debug!(
                "stage #{index} {}: {before} -> {} bytes ({})",
                stage.name(),
                current.len(),
                current.format()
            );
        }

        Ok(current)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn append(byte: u8) -> TransformFn {
        Box::new(move |input| {
            let mut out = input.to_vec();
            out.push(byte);
            Ok(out)
        })
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let input = ImageBuffer::new(vec![1, 2, 3, 4]);
        let output = Pipeline::new().apply(&input).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_stages_apply_left_to_right() {
        let mut pipeline = Pipeline::new();
        pipeline.push_fn("a", append(b'a')).push_fn("b", append(b'b'));
        assert_eq!(pipeline.len(), 2);
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);

        let output = pipeline.apply(&ImageBuffer::new(b"x".to_vec())).unwrap();
        assert_eq!(output.as_bytes(), b"xab");
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let later_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&later_calls);

        let mut pipeline = Pipeline::new();
        pipeline
            .push_fn("ok", append(1))
            .push_fn(
                "broken",
                Box::new(|_| Err(Error::Configuration("encoder exploded".to_string()))),
            )
            .push_fn(
                "never",
                Box::new(move |input| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(input.to_vec())
                }),
            );

        let err = pipeline.apply(&ImageBuffer::new(vec![0])).unwrap_err();
        match err {
            Error::Transform { index, stage, message } => {
                assert_eq!(index, 1);
                assert_eq!(stage, "broken");
                assert!(message.contains("encoder exploded"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_output_format_is_resniffed() {
        let mut pipeline = Pipeline::new();
        pipeline.push_fn("to-jpeg-magic", Box::new(|_| Ok(vec![0xFF, 0xD8, 0xFF, 0xD9])));
        let output = pipeline.apply(&ImageBuffer::new(vec![0; 8])).unwrap();
        assert_eq!(output.format(), crate::buffer::ImageFormat::Jpeg);
    }
}
