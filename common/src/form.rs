use validator::{Validate, ValidationErrors};

pub const NAME_TOO_SHORT: &str = "Device name must be at least 3 characters.";
pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";
pub const CAPTURE_MIME: &str = "image/jpeg";
pub const CAPTURE_QUALITY: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Values of the device creation form.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct NewDevice {
    #[validate(length(min = 3, message = "Device name must be at least 3 characters."))]
    pub name: String,
    pub img: Option<ImageUpload>,
}

/// First validation message for `field`, if any.
pub fn field_error(errors: &ValidationErrors, field: &str) -> Option<String> {
    errors
        .field_errors()
        .get(field)
        .and_then(|errs| errs.first())
        .map(|e| {
            e.message
                .as_ref()
                .map_or_else(|| e.code.to_string(), |m| m.to_string())
        })
}

/// Validates `draft` and only then hands it to `send`.
///
/// `send` usually returns the request future; it is never called for an
/// invalid draft.
pub fn submit<F, R>(draft: &NewDevice, send: F) -> Result<R, ValidationErrors>
where
    F: FnOnce(NewDevice) -> R,
{
    draft.validate()?;
    Ok(send(draft.clone()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageTab {
    #[default]
    Upload,
    Camera,
    Preview,
}

impl ImageTab {
    pub const ALL: [ImageTab; 3] = [ImageTab::Upload, ImageTab::Camera, ImageTab::Preview];

    pub fn label(&self) -> &'static str {
        match self {
            ImageTab::Upload => "Upload",
            ImageTab::Camera => "Camera",
            ImageTab::Preview => "Preview",
        }
    }
}

/// What the component has to do with the camera after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraCommand {
    Start,
    Stop,
    Keep,
}

/// Image tab and camera bookkeeping of the creation form.
///
/// The camera is held exactly while the camera tab is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePicker {
    pub tab: ImageTab,
    pub preview: Option<String>,
    pub camera_active: bool,
}

impl ImagePicker {
    pub fn can_preview(&self) -> bool {
        self.preview.is_some()
    }

    pub fn select_tab(&mut self, tab: ImageTab) -> CameraCommand {
        if tab == ImageTab::Preview && !self.can_preview() {
            return CameraCommand::Keep;
        }
        self.tab = tab;
        match (tab, self.camera_active) {
            (ImageTab::Camera, false) => CameraCommand::Start,
            (ImageTab::Camera, true) => CameraCommand::Keep,
            (_, true) => self.camera_stopped(),
            (_, false) => CameraCommand::Keep,
        }
    }

    /// A requested stream arrived. Returns whether to show it; a stream that
    /// arrives after the camera tab was left, or after another stream was
    /// taken, has to be stopped unseen.
    pub fn camera_ready(&mut self) -> bool {
        if self.tab != ImageTab::Camera || self.camera_active {
            return false;
        }
        self.camera_active = true;
        true
    }

    pub fn camera_stopped(&mut self) -> CameraCommand {
        self.camera_active = false;
        CameraCommand::Stop
    }

    /// An image was chosen from disk; the upload tab stays visible.
    pub fn uploaded(&mut self, preview: String) -> Option<String> {
        self.preview.replace(preview)
    }

    /// A frame was captured; shows it and releases the camera.
    pub fn captured(&mut self, preview: String) -> (Option<String>, CameraCommand) {
        let old = self.preview.replace(preview);
        self.tab = ImageTab::Preview;
        let cmd = if self.camera_active {
            self.camera_stopped()
        } else {
            CameraCommand::Keep
        };
        (old, cmd)
    }

    /// Drops the image and goes back to the upload tab. Returns the old preview.
    pub fn clear(&mut self) -> Option<String> {
        self.tab = ImageTab::Upload;
        self.preview.take()
    }

    pub fn reset(&mut self) -> (Option<String>, CameraCommand) {
        let old = self.clear();
        let cmd = if self.camera_active {
            self.camera_stopped()
        } else {
            CameraCommand::Keep
        };
        (old, cmd)
    }
}
