//! Regression guard: never keep a result that is not strictly smaller.

use crate::buffer::ImageBuffer;

/// Outcome of the regression guard.
#[derive(Debug, Clone, Copy)]
pub struct Guarded<'a> {
    /// The buffer to keep.
    pub buffer: &'a ImageBuffer,
    /// Whether the transformed candidate was kept.
    pub optimized: bool,
}

/// Keep `candidate` only if it is strictly smaller than `original`.
///
/// Ties keep the original.
#[must_use]
pub fn keep_smaller<'a>(original: &'a ImageBuffer, candidate: &'a ImageBuffer) -> Guarded<'a> {
    if candidate.len() < original.len() {
        Guarded {
            buffer: candidate,
            optimized: true,
        }
    } else {
        Guarded {
            buffer: original,
            optimized: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smaller_candidate_wins() {
        let original = ImageBuffer::new(vec![0; 1000]);
        let candidate = ImageBuffer::new(vec![1; 800]);
        let kept = keep_smaller(&original, &candidate);
        assert!(kept.optimized);
        assert_eq!(kept.buffer.len(), 800);
    }

    #[test]
    fn test_tie_keeps_original() {
        let original = ImageBuffer::new(vec![0; 2000]);
        let candidate = ImageBuffer::new(vec![1; 2000]);
        let kept = keep_smaller(&original, &candidate);
        assert!(!kept.optimized);
        assert!(std::ptr::eq(kept.buffer, &original));
    }

    #[test]
    fn test_larger_candidate_rejected() {
        let original = ImageBuffer::new(vec![0; 10]);
        let candidate = ImageBuffer::new(vec![1; 11]);
        let kept = keep_smaller(&original, &candidate);
        assert!(!kept.optimized);
        assert_eq!(kept.buffer.as_bytes(), original.as_bytes());
    }
}
