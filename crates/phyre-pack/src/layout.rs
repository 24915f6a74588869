//! Flat buffer layout for one batch call.
//!
//! Every packed output is a flat row-major array:
//!
//! ```text
//! images   [image_frames][image_size]                  u8
//! masks    [mask_frames][object_count][image_size]     u8
//! features [feature_frames][object_count][feature_size] f32
//! ```
//!
//! [`BatchLayout`] owns the offset arithmetic so no caller indexes these
//! buffers by hand. [`BatchOutput`] pairs a layout with its buffers.

use std::ops::Range;

use crate::pack::PackRequest;

/// Dimensions of the packed outputs of one batch call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchLayout {
    /// Frames with a full-scene image.
    pub image_frames: usize,
    /// Frames with per-object masks. Either `image_frames` or zero.
    pub mask_frames: usize,
    /// Frames with per-object feature vectors.
    pub feature_frames: usize,
    /// Object slots per frame, fixed from frame 0.
    pub object_count: usize,
    /// Pixels per image (`width * height`).
    pub image_size: usize,
    /// Floats per object feature vector.
    pub feature_size: usize,
}

impl BatchLayout {
    /// Plan the layout for `frame_count` frames under `request`.
    ///
    /// Masks are packed only when both images and masks are requested.
    pub fn plan(
        request: &PackRequest,
        frame_count: usize,
        object_count: usize,
        image_size: usize,
        feature_size: usize,
    ) -> Self {
        let image_frames = if request.need_images { frame_count } else { 0 };
        Self {
            image_frames,
            mask_frames: if request.need_object_masks {
                image_frames
            } else {
                0
            },
            feature_frames: if request.need_featurized_objects {
                frame_count
            } else {
                0
            },
            object_count,
            image_size,
            feature_size,
        }
    }

    /// Whether any per-object slot is packed.
    pub fn has_object_slots(&self) -> bool {
        self.mask_frames > 0 || self.feature_frames > 0
    }

    /// Total image bytes.
    pub fn images_len(&self) -> usize {
        self.image_frames * self.image_size
    }

    /// Total mask bytes.
    pub fn masks_len(&self) -> usize {
        self.mask_frames * self.masks_per_frame()
    }

    /// Total feature floats.
    pub fn features_len(&self) -> usize {
        self.feature_frames * self.features_per_frame()
    }

    fn masks_per_frame(&self) -> usize {
        self.object_count * self.image_size
    }

    fn features_per_frame(&self) -> usize {
        self.object_count * self.feature_size
    }

    /// Range of `frame`'s image within the images buffer.
    pub fn image_range(&self, frame: usize) -> Range<usize> {
        span(frame * self.image_size, self.image_size)
    }

    /// Range of all of `frame`'s masks within the masks buffer.
    pub fn frame_masks_range(&self, frame: usize) -> Range<usize> {
        span(frame * self.masks_per_frame(), self.masks_per_frame())
    }

    /// Range of one object's mask within the masks buffer.
    pub fn object_mask_range(&self, frame: usize, object: usize) -> Range<usize> {
        span(
            frame * self.masks_per_frame() + object * self.image_size,
            self.image_size,
        )
    }

    /// Range of all of `frame`'s feature vectors within the features buffer.
    pub fn frame_features_range(&self, frame: usize) -> Range<usize> {
        span(frame * self.features_per_frame(), self.features_per_frame())
    }

    /// Range of one object's feature vector within the features buffer.
    pub fn object_features_range(&self, frame: usize, object: usize) -> Range<usize> {
        span(
            frame * self.features_per_frame() + object * self.feature_size,
            self.feature_size,
        )
    }
}

fn span(start: usize, len: usize) -> Range<usize> {
    start..start + len
}

/// Buffers sized by a [`BatchLayout`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchOutput {
    /// Layout the buffers follow.
    pub layout: BatchLayout,
    /// Full-scene images.
    pub images: Vec<u8>,
    /// Per-object masks.
    pub masks: Vec<u8>,
    /// Per-object feature vectors.
    pub features: Vec<f32>,
}

impl BatchOutput {
    /// Allocate zeroed buffers for `layout`.
    pub fn allocate(layout: BatchLayout) -> Self {
        Self {
            layout,
            images: vec![0; layout.images_len()],
            masks: vec![0; layout.masks_len()],
            features: vec![0.0; layout.features_len()],
        }
    }

    /// `frame`'s image.
    pub fn image(&self, frame: usize) -> &[u8] {
        &self.images[self.layout.image_range(frame)]
    }

    /// Mutable view of `frame`'s image.
    pub fn image_mut(&mut self, frame: usize) -> &mut [u8] {
        let range = self.layout.image_range(frame);
        &mut self.images[range]
    }

    /// One object's mask in `frame`.
    pub fn object_mask(&self, frame: usize, object: usize) -> &[u8] {
        &self.masks[self.layout.object_mask_range(frame, object)]
    }

    /// Mutable view of all of `frame`'s masks.
    pub fn frame_masks_mut(&mut self, frame: usize) -> &mut [u8] {
        let range = self.layout.frame_masks_range(frame);
        &mut self.masks[range]
    }

    /// One object's feature vector in `frame`.
    pub fn object_features(&self, frame: usize, object: usize) -> &[f32] {
        &self.features[self.layout.object_features_range(frame, object)]
    }

    /// Mutable view of all of `frame`'s feature vectors.
    pub fn frame_features_mut(&mut self, frame: usize) -> &mut [f32] {
        let range = self.layout.frame_features_range(frame);
        &mut self.features[range]
    }
}
