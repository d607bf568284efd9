use crate::backend::geometry_backend::GeometryBackend;
use crate::foundation::core::GeometryId;
use crate::foundation::error::{GeomError, GeomResult};
use crate::render::shader::{GeometryExport, ShaderActivation};

impl GeometryBackend {
    /// Draw the cached geometry `id`.
    ///
    /// Stamps the record with the current clock and asks the shader stage to activate a program.
    /// Unless `id` is already bound, vertex attribute slots are disabled, the record is exported
    /// to the shader stage and its index buffer bound. Single-use records are destroyed after the
    /// draw.
    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub fn draw(&mut self, id: &GeometryId) -> GeomResult<()> {
        let format = {
            let mut state = self.state.borrow_mut();
            state.dispatch.require_surface()?;
            let now = state.dispatch.clock;
            let record = state
                .cache
                .get_mut(id)
                .ok_or_else(|| GeomError::UnknownGeometry(id.clone()))?;
            let format = record.indices().index_format().ok_or_else(|| {
                GeomError::invalid_data(format!("index buffer of {id} has no index element type"))
            })?;
            record.touch(now);
            format
        };

        // Activation may allocate elsewhere and evict through the authority, so the state is not
        // borrowed across it.
        if self.shader.request_activation() == ShaderActivation::Activated {
            // A fresh program has no attribute pointers; same as a shader-activated event.
            self.state.borrow_mut().dispatch.unbind();
        }

        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        let record = state
            .cache
            .get(id)
            .ok_or_else(|| GeomError::UnknownGeometry(id.clone()))?;

        if state.dispatch.marker.is_bound_to(id) {
            state.stats.fast_path_draws = state.stats.fast_path_draws.saturating_add(1);
        } else {
            for slot in 0..self.opts.max_vertex_attribs {
                state.device.disable_vertex_attrib(slot);
            }
            self.shader.export_geometry(&GeometryExport::of(record));
            state.device.bind_index_buffer(record.indices().handle());
            state.dispatch.bind(id.clone());
            state.stats.exports = state.stats.exports.saturating_add(1);
        }

        state.device.draw_elements(record.primitive(), record.index_count(), format);
        state.device.flush();
        state.stats.draws = state.stats.draws.saturating_add(1);
        let transient = !record.is_fixed();
        drop(guard);

        if transient {
            self.destroy(id);
            let mut state = self.state.borrow_mut();
            state.dispatch.unbind();
            state.stats.transient_destroyed = state.stats.transient_destroyed.saturating_add(1);
            tracing::debug!("destroyed single-use geometry after draw");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/backend/draw.rs"]
mod tests;
