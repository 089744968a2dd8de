//! celeste_animation - sprite sheet clips for the Celeste-like platformer
//!
//! Characters are drawn from horizontal strips (or grids) of equally sized
//! frames. This crate keeps the timing math free of rendering so the game
//! simulation can ask "which frame?" and "is the clip over?" on its own, and
//! ships a small plugin that copies the chosen frame onto a bevy `Sprite`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use celeste_animation::{AnimationSet, ClipSpec, LoopMode};
//!
//! let specs = [
//!     ("idle", ClipSpec::looping("IDLE.png", 96, 96, 0.08)),
//!     ("dash", ClipSpec::looping("DASH.png", 96, 96, 0.04).with_max_frames(5)),
//! ];
//! let (clips, missing) = AnimationSet::probe_all("assets/samurai", specs);
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};

/// How a clip behaves once its last frame has been shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Wrap around to the first frame
    #[default]
    Loop,
    /// Hold the last frame
    Once,
}

/// Frame timing of one animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationClip {
    pub frame_count: usize,
    /// Seconds per frame
    pub frame_duration: f32,
    pub loop_mode: LoopMode,
}

impl AnimationClip {
    pub fn new(frame_count: usize, frame_duration: f32, loop_mode: LoopMode) -> Self {
        Self {
            frame_count,
            frame_duration,
            loop_mode,
        }
    }

    /// Length of one pass through the clip in seconds
    pub fn duration(&self) -> f32 {
        self.frame_count as f32 * self.frame_duration
    }

    /// Frame shown `time` seconds into the clip
    pub fn frame_at(&self, time: f32) -> usize {
        if self.frame_count == 0 || self.frame_duration <= 0.0 {
            return 0;
        }
        let step = (time.max(0.0) / self.frame_duration) as usize;
        match self.loop_mode {
            LoopMode::Loop => step % self.frame_count,
            LoopMode::Once => step.min(self.frame_count - 1),
        }
    }

    /// A `Once` clip is finished after its full duration; looping clips never finish
    pub fn is_finished(&self, time: f32) -> bool {
        match self.loop_mode {
            LoopMode::Loop => false,
            LoopMode::Once => time >= self.duration(),
        }
    }
}

/// Grid geometry of a sprite sheet image
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteSheet {
    pub path: PathBuf,
    pub frame_width: u32,
    pub frame_height: u32,
    pub columns: u32,
    pub rows: u32,
    /// Only the first `max_frames` frames are used
    pub max_frames: Option<usize>,
}

impl SpriteSheet {
    pub fn new(path: impl Into<PathBuf>, frame_width: u32, frame_height: u32) -> Self {
        Self {
            path: path.into(),
            frame_width,
            frame_height,
            columns: 1,
            rows: 1,
            max_frames: None,
        }
    }

    /// Read the image header and size the grid.
    ///
    /// A zero frame width or height means "the whole image".
    pub fn probe(
        path: impl AsRef<Path>,
        frame_width: u32,
        frame_height: u32,
    ) -> Result<Self, image::ImageError> {
        let path = path.as_ref();
        let (width, height) = image::image_dimensions(path)?;
        let mut sheet = Self::new(path, frame_width, frame_height);
        sheet.update_from_image_size(width, height);
        Ok(sheet)
    }

    /// Recompute columns and rows for an image of the given size
    pub fn update_from_image_size(&mut self, image_width: u32, image_height: u32) {
        if self.frame_width == 0 {
            self.frame_width = image_width;
        }
        if self.frame_height == 0 {
            self.frame_height = image_height;
        }
        self.columns = image_width / self.frame_width.max(1);
        self.rows = image_height / self.frame_height.max(1);
    }

    pub fn frame_count(&self) -> usize {
        let all = (self.columns * self.rows) as usize;
        self.max_frames.map_or(all, |max| all.min(max))
    }

    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.frame_width as f32, self.frame_height as f32)
    }

    /// Pixel rectangle of a frame, row-major from the top-left
    pub fn frame_rect(&self, frame: usize) -> Rect {
        let columns = self.columns.max(1);
        let col = frame as u32 % columns;
        let row = frame as u32 / columns;
        let x = (col * self.frame_width) as f32;
        let y = (row * self.frame_height) as f32;
        Rect::new(
            x,
            y,
            x + self.frame_width as f32,
            y + self.frame_height as f32,
        )
    }
}

/// Declarative description of a clip before its sheet has been probed
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    pub file: String,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_duration: f32,
    pub loop_mode: LoopMode,
    pub max_frames: Option<usize>,
}

impl ClipSpec {
    pub fn looping(file: impl Into<String>, frame_width: u32, frame_height: u32, frame_duration: f32) -> Self {
        Self {
            file: file.into(),
            frame_width,
            frame_height,
            frame_duration,
            loop_mode: LoopMode::Loop,
            max_frames: None,
        }
    }

    pub fn once(file: impl Into<String>, frame_width: u32, frame_height: u32, frame_duration: f32) -> Self {
        Self {
            loop_mode: LoopMode::Once,
            ..Self::looping(file, frame_width, frame_height, frame_duration)
        }
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = Some(max_frames);
        self
    }
}

/// A probed sheet and the timing used to play it
#[derive(Debug, Clone, PartialEq)]
pub struct SheetAnimation {
    pub sheet: SpriteSheet,
    pub clip: AnimationClip,
}

impl SheetAnimation {
    pub fn from_spec(base: &Path, spec: &ClipSpec) -> Result<Self, image::ImageError> {
        let mut sheet = SpriteSheet::probe(base.join(&spec.file), spec.frame_width, spec.frame_height)?;
        sheet.max_frames = spec.max_frames;
        let clip = AnimationClip::new(sheet.frame_count(), spec.frame_duration, spec.loop_mode);
        Ok(Self { sheet, clip })
    }

    pub fn rect_at(&self, time: f32) -> Rect {
        self.sheet.frame_rect(self.clip.frame_at(time))
    }
}

/// Clips for one character, keyed by animation id
#[derive(Debug, Clone)]
pub struct AnimationSet<K> {
    clips: HashMap<K, SheetAnimation>,
}

impl<K> Default for AnimationSet<K> {
    fn default() -> Self {
        Self {
            clips: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Copy> AnimationSet<K> {
    /// Probe every spec under `base`.
    ///
    /// Returns the set and one message per sheet that could not be read.
    /// Sheets without frames are skipped as well.
    pub fn probe_all(
        base: impl AsRef<Path>,
        specs: impl IntoIterator<Item = (K, ClipSpec)>,
    ) -> (Self, Vec<String>) {
        let base = base.as_ref();
        let mut set = Self::default();
        let mut missing = Vec::new();
        for (key, spec) in specs {
            match SheetAnimation::from_spec(base, &spec) {
                Ok(animation) if animation.clip.frame_count > 0 => {
                    set.clips.insert(key, animation);
                }
                Ok(_) => missing.push(format!("Spritesheet had no frames: {}", base.join(&spec.file).display())),
                Err(e) => missing.push(format!("Missing animation sheet {}: {}", base.join(&spec.file).display(), e)),
            }
        }
        (set, missing)
    }

    pub fn insert(&mut self, key: K, animation: SheetAnimation) {
        self.clips.insert(key, animation);
    }

    pub fn get(&self, key: K) -> Option<&SheetAnimation> {
        self.clips.get(&key)
    }

    pub fn contains(&self, key: K) -> bool {
        self.clips.contains_key(&key)
    }

    pub fn clip(&self, key: K) -> Option<AnimationClip> {
        self.clips.get(&key).map(|a| a.clip)
    }

    /// Duration of a clip, zero when it is missing
    pub fn duration(&self, key: K) -> f32 {
        self.clip(key).map_or(0.0, |c| c.duration())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &SheetAnimation)> {
        self.clips.iter()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// Frame to show on an entity's `Sprite`
#[derive(Component, Debug, Clone, Default)]
pub struct SpriteFrame {
    pub image: Handle<Image>,
    pub rect: Option<Rect>,
    pub flip_x: bool,
}

/// Plugin copying [`SpriteFrame`] changes onto sprites
pub struct SpriteAnimationPlugin;

impl Plugin for SpriteAnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, apply_sprite_frames);
    }
}

fn apply_sprite_frames(mut query: Query<(&SpriteFrame, &mut Sprite), Changed<SpriteFrame>>) {
    for (frame, mut sprite) in query.iter_mut() {
        if sprite.image != frame.image {
            sprite.image = frame.image.clone();
        }
        sprite.rect = frame.rect;
        sprite.flip_x = frame.flip_x;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_clip_wraps() {
        let clip = AnimationClip::new(4, 0.1, LoopMode::Loop);
        assert_eq!(clip.frame_at(0.0), 0);
        assert_eq!(clip.frame_at(0.25), 2);
        assert_eq!(clip.frame_at(0.45), 0);
        assert!(!clip.is_finished(100.0));
    }

    #[test]
    fn test_once_clip_holds_last_frame() {
        let clip = AnimationClip::new(3, 0.1, LoopMode::Once);
        assert_eq!(clip.frame_at(5.0), 2);
        assert!(!clip.is_finished(0.29));
        assert!(clip.is_finished(0.31));
    }

    #[test]
    fn test_degenerate_clip() {
        let clip = AnimationClip::new(0, 0.1, LoopMode::Loop);
        assert_eq!(clip.frame_at(1.0), 0);
        assert_eq!(clip.duration(), 0.0);
    }

    #[test]
    fn test_sheet_grid() {
        let mut sheet = SpriteSheet::new("RUN.png", 96, 96);
        sheet.update_from_image_size(96 * 8, 96);
        assert_eq!(sheet.columns, 8);
        assert_eq!(sheet.frame_count(), 8);
        assert_eq!(sheet.frame_rect(3), Rect::new(288.0, 0.0, 384.0, 96.0));

        sheet.max_frames = Some(5);
        assert_eq!(sheet.frame_count(), 5);
    }

    #[test]
    fn test_zero_frame_size_uses_whole_image() {
        let mut sheet = SpriteSheet::new("IDLE.png", 0, 0);
        sheet.update_from_image_size(79, 69);
        assert_eq!(sheet.frame_count(), 1);
        assert_eq!(sheet.frame_size(), Vec2::new(79.0, 69.0));
    }

    #[test]
    fn test_probe_all_reports_missing() {
        let dir = tempfile::tempdir().unwrap();
        image::RgbaImage::new(40, 20)
            .save(dir.path().join("IDLE.png"))
            .unwrap();

        let specs = [
            (0u8, ClipSpec::looping("IDLE.png", 20, 20, 0.1)),
            (1u8, ClipSpec::once("DEATH.png", 20, 20, 0.1)),
        ];
        let (set, missing) = AnimationSet::probe_all(dir.path(), specs);
        assert_eq!(set.len(), 1);
        assert_eq!(set.clip(0).map(|c| c.frame_count), Some(2));
        assert!((set.duration(0) - 0.2).abs() < 1e-6);
        assert_eq!(set.duration(1), 0.0);
        assert_eq!(missing.len(), 1);
    }
}
