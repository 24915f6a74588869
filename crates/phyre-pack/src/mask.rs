//! Per-object segmentation masks.

use phyre_core::{Rasterizer, Scene};

/// Render one isolated mask per active body of `scene` into `out`.
///
/// Bodies are visited in [`Scene::active_bodies`] order, so mask `i`
/// refers to the same object as feature vector `i`. Each body is rendered
/// alone in a scene of the same dimensions and copied to
/// `out[i * image_size..(i + 1) * image_size]`.
///
/// A render of the wrong size zero-fills that object's region and emits a
/// `warn!` event; the remaining objects are still rendered. `out` must
/// hold exactly one image per active body.
pub fn render_object_masks<R: Rasterizer + ?Sized>(
    rasterizer: &R,
    scene: &Scene,
    out: &mut [u8],
) -> Result<(), phyre_core::EngineError> {
    let image_size = scene.image_size();
    if image_size == 0 {
        return Ok(());
    }
    for (index, (body, region)) in scene
        .active_bodies()
        .zip(out.chunks_exact_mut(image_size))
        .enumerate()
    {
        let image = rasterizer.render(&scene.isolate(body))?;
        if image.values.len() == image_size {
            region.copy_from_slice(&image.values);
        } else {
            tracing::warn!(
                object = index,
                expected = image_size,
                actual = image.values.len(),
                "object mask has wrong size; zero-filling"
            );
            region.fill(0);
        }
    }
    Ok(())
}
