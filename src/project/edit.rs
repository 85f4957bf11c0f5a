//! Value-returning edits. Each operation leaves `self` untouched and returns the next snapshot.

use crate::{
    foundation::error::{ShowError, ShowResult},
    project::model::{Analysis, Asset, Clip, Layer, Project},
};

/// Fresh random id for layers and clips created by the editing surface.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl Project {
    /// Append an empty, unmuted layer with a generated id.
    pub fn with_layer(&self, name: impl Into<String>) -> Project {
        let mut next = self.clone();
        next.layers.push(Layer {
            id: new_id(),
            name: name.into(),
            muted: false,
            clips: Vec::new(),
        });
        next
    }

    /// Append `clip` to a layer after validating it.
    pub fn with_clip(&self, layer_id: &str, clip: Clip) -> ShowResult<Project> {
        clip.validate(self.channel_count)?;
        if self.clip(&clip.id).is_some() {
            return Err(ShowError::validation(format!(
                "clip id '{}' already exists",
                clip.id
            )));
        }
        let mut next = self.clone();
        let layer = layer_mut(&mut next, layer_id)?;
        layer.clips.push(clip);
        Ok(next)
    }

    /// Replace the clip with the same id, keeping its position in its layer.
    pub fn with_updated_clip(&self, clip: Clip) -> ShowResult<Project> {
        clip.validate(self.channel_count)?;
        let mut next = self.clone();
        let slot = next
            .layers
            .iter_mut()
            .flat_map(|l| l.clips.iter_mut())
            .find(|c| c.id == clip.id)
            .ok_or_else(|| ShowError::validation(format!("unknown clip id '{}'", clip.id)))?;
        *slot = clip;
        Ok(next)
    }

    /// Remove a clip from whichever layer holds it. Unknown ids leave the project unchanged.
    pub fn without_clip(&self, clip_id: &str) -> Project {
        let mut next = self.clone();
        for layer in &mut next.layers {
            layer.clips.retain(|c| c.id != clip_id);
        }
        next
    }

    /// Set a layer's mute flag.
    pub fn with_layer_muted(&self, layer_id: &str, muted: bool) -> ShowResult<Project> {
        let mut next = self.clone();
        layer_mut(&mut next, layer_id)?.muted = muted;
        Ok(next)
    }

    /// Insert or replace an asset.
    pub fn with_asset(&self, id: impl Into<String>, asset: Asset) -> Project {
        let mut next = self.clone();
        next.assets.insert(id.into(), asset);
        next
    }

    /// Attach analysis; the show duration follows the analyzed audio length.
    pub fn with_analysis(&self, analysis: Analysis) -> Project {
        let mut next = self.clone();
        next.duration = analysis.duration * 1000.0;
        next.analysis = Some(analysis);
        next
    }
}

fn layer_mut<'a>(project: &'a mut Project, layer_id: &str) -> ShowResult<&'a mut Layer> {
    project
        .layers
        .iter_mut()
        .find(|l| l.id == layer_id)
        .ok_or_else(|| ShowError::validation(format!("unknown layer id '{layer_id}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/project/edit.rs"]
mod tests;
