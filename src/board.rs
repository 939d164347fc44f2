//! Board controller: which image is on screen, and what happens to the
//! project when the user navigates or saves.
//!
//! The controller owns the project payload and the engine. Navigation feeds
//! the stored sequence of the selected image into the engine; committed
//! changes come back through an engine observer and mark the project for
//! auto-save.

use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::engine::AnnotationEngine;
use crate::error::EngineError;
use crate::format::{AutoSaveManager, FormatError, ProjectData, json};
use crate::geometry::Point;
use crate::message::Message;
use crate::model::Annotation;
use crate::render::RenderSurface;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Project has no images")]
    NoImages,

    #[error("Natural size of image {0} is unknown")]
    MissingDimensions(String),

    #[error("No save location configured")]
    NoSavePath,
}

pub struct BoardController<S: RenderSurface> {
    engine: AnnotationEngine<S>,
    project: ProjectData,
    /// Index into `project.images` of the image on screen.
    current: Option<usize>,
    auto_save: AutoSaveManager,
    save_path: Option<PathBuf>,
    /// Raised by the engine observer on every committed change.
    changed: Rc<Cell<bool>>,
}

impl<S: RenderSurface> BoardController<S> {
    /// Build a board for `project`. No image is opened yet.
    pub fn new(config: &AppConfig, project: ProjectData, surface: S) -> Result<Self, BoardError> {
        let classes = project.class_set()?;
        let mut engine = AnnotationEngine::new(config.engine.clone(), classes, surface);

        let changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&changed);
        engine.add_observer(move |image_id: &str, annotations: &[Annotation]| {
            log::debug!("Image {} now has {} annotation(s)", image_id, annotations.len());
            flag.set(true);
        });

        log::info!(
            "Opened project {:?}: {} classes, {} images",
            project.name,
            project.classes.len(),
            project.images.len()
        );

        Ok(Self {
            engine,
            project,
            current: None,
            auto_save: AutoSaveManager::from_preferences(&config.preferences),
            save_path: None,
            changed,
        })
    }

    /// Where [`Self::save`] and auto-save write the project.
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    pub fn with_auto_save(mut self, auto_save: AutoSaveManager) -> Self {
        self.auto_save = auto_save;
        self
    }

    pub fn engine(&self) -> &AnnotationEngine<S> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AnnotationEngine<S> {
        &mut self.engine
    }

    pub fn project(&self) -> &ProjectData {
        &self.project
    }

    pub fn save_path(&self) -> Option<&Path> {
        self.save_path.as_deref()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.project.images.get(i))
            .map(|image| image.name.as_str())
    }

    /// Whether committed changes have not been written yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.auto_save.has_unsaved_changes()
    }

    /// Record the natural size of an image, e.g. once it has been decoded.
    pub fn set_dimensions(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
    ) -> Result<(), BoardError> {
        let image = self
            .project
            .images
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| EngineError::UnknownImage(name.to_string()))?;
        image.dimensions = Some((width, height));
        Ok(())
    }

    /// Put the image at `index` on screen.
    ///
    /// A pending label is cancelled first. The index is kept even if the
    /// image cannot be displayed, so next/prev continue from it.
    pub fn open(&mut self, index: usize) -> Result<(), BoardError> {
        let image = self.project.images.get(index).ok_or(BoardError::NoImages)?;
        let name = image.name.clone();
        let natural = image
            .natural_size()
            .ok_or_else(|| BoardError::MissingDimensions(name.clone()))?;
        let initial = image.to_annotations();

        if self.engine.cancel_label() {
            log::debug!("Pending label cancelled by navigation");
        }

        self.current = Some(index);
        log::debug!("Opening image {} ({}/{})", name, index + 1, self.project.images.len());
        self.engine
            .load_image(&name, natural.width, natural.height, Some(initial))?;
        Ok(())
    }

    /// Open an image by name.
    pub fn select(&mut self, name: &str) -> Result<(), BoardError> {
        let index = self
            .project
            .images
            .iter()
            .position(|i| i.name == name)
            .ok_or_else(|| EngineError::UnknownImage(name.to_string()))?;
        self.open(index)
    }

    /// Open the following image, wrapping to the first.
    pub fn next(&mut self) -> Result<(), BoardError> {
        let len = self.project.images.len();
        if len == 0 {
            return Err(BoardError::NoImages);
        }
        let index = self.current.map_or(0, |i| (i + 1) % len);
        self.open(index)
    }

    /// Open the preceding image, wrapping to the last.
    pub fn prev(&mut self) -> Result<(), BoardError> {
        let len = self.project.images.len();
        if len == 0 {
            return Err(BoardError::NoImages);
        }
        let index = self.current.map_or(len - 1, |i| (i + len - 1) % len);
        self.open(index)
    }

    /// Process one input message.
    pub fn update(&mut self, message: Message) -> Result<(), BoardError> {
        let result = self.dispatch(message);

        if self.changed.replace(false) {
            self.auto_save.record_change();
        }
        self.poll_auto_save();

        result
    }

    fn dispatch(&mut self, message: Message) -> Result<(), BoardError> {
        match message {
            Message::PointerDown { x, y } => {
                self.engine.pointer_down(Point::new(x, y));
            }
            Message::PointerMove { x, y } => {
                log::trace!("Pointer at ({}, {})", x, y);
                self.engine.pointer_move(Point::new(x, y));
            }
            Message::PointerUp { x, y } => {
                self.engine.pointer_up(Point::new(x, y));
            }
            Message::LabelChosen { class } => {
                self.engine.choose_label(&class)?;
            }
            Message::LabelCancelled => {
                self.engine.cancel_label();
            }
            Message::DeleteAnnotation { id } => {
                let image = self.require_current()?;
                self.engine.delete_annotation(&image, &id)?;
            }
            Message::ClearAnnotations => {
                let image = self.require_current()?;
                self.engine.clear_annotations(&image)?;
            }
            Message::NextImage => self.next()?,
            Message::PrevImage => self.prev()?,
            Message::SelectImage { name } => self.select(&name)?,
            Message::Save => self.save()?,
        }
        Ok(())
    }

    fn require_current(&self) -> Result<String, BoardError> {
        self.engine
            .current_image()
            .map(str::to_string)
            .ok_or(BoardError::Engine(EngineError::NoImageLoaded))
    }

    /// The project with every image's current annotations.
    pub fn to_payload(&mut self) -> ProjectData {
        self.project.apply_store(self.engine.sync_store());
        self.project.clone()
    }

    /// Write the project to the save path.
    pub fn save(&mut self) -> Result<(), BoardError> {
        let path = self.save_path.clone().ok_or(BoardError::NoSavePath)?;
        let payload = self.to_payload();
        let result = json::save(&payload, &path);
        self.auto_save.record_save(result.is_ok());
        result?;
        Ok(())
    }

    fn poll_auto_save(&mut self) {
        if self.save_path.is_none() || !self.auto_save.is_due() {
            return;
        }
        log::debug!("Auto-saving project {:?}", self.project.name);
        if let Err(e) = self.save() {
            log::error!("Auto-save failed: {}", e);
        }
    }
}
