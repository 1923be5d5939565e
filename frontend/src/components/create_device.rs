use std::{cell::RefCell, rc::Rc};

use common::{
    form::{self, CameraCommand, ImagePicker, ImageTab, ImageUpload, NewDevice},
    req::Device,
};
use web_sys::{HtmlCanvasElement, HtmlInputElement, HtmlVideoElement, MediaStream, Url};
use yew::prelude::*;

use super::{
    camera,
    toast::{use_toaster, Toaster},
};
use crate::{request, utils};

const CREATED: &str = "Street Guard device created successfully!";
const NOT_CREATED: &str = "Failed to create Street Guard device.";
const NO_CAMERA: &str = "Unable to access the camera. Check the browser permissions.";
const NO_CAPTURE: &str = "Unable to capture an image.";

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub on_success: Callback<Device>,
}

fn revoke(preview: Option<String>) {
    if let Some(url) = preview {
        if let Err(err) = Url::revoke_object_url(&url) {
            log::warn!("cannot revoke preview: {:#}", utils::js_err(err));
        }
    }
}

/// Camera handle shared between the form callbacks and the camera futures.
#[derive(Clone)]
struct CameraSlot {
    picker: Rc<RefCell<ImagePicker>>,
    stream: Rc<RefCell<Option<MediaStream>>>,
    video: NodeRef,
    toaster: Toaster,
    redraw: Callback<()>,
}

impl CameraSlot {
    fn run(&self, cmd: CameraCommand) {
        match cmd {
            CameraCommand::Start => self.start(),
            CameraCommand::Stop => self.release(),
            CameraCommand::Keep => {}
        }
        self.redraw.emit(());
    }

    fn start(&self) {
        let Some(video) = self.video.cast::<HtmlVideoElement>() else {
            log::error!("camera view is not mounted");
            return;
        };
        let slot = self.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match camera::open().await {
                Ok(stream) => {
                    if slot.picker.borrow_mut().camera_ready() {
                        *slot.stream.borrow_mut() = Some(stream.clone());
                        let attached = camera::attach(&video, &stream).await;
                        // the tab may have been left while playback was starting
                        let still_held = slot.stream.borrow().is_some();
                        if let (Err(err), true) = (attached, still_held) {
                            log::error!("Error showing camera: {err:#}");
                            slot.picker.borrow_mut().camera_stopped();
                            slot.release();
                            slot.toaster.error(NO_CAMERA);
                        }
                    } else {
                        camera::stop(&stream, None);
                    }
                }
                Err(err) => {
                    log::error!("Error accessing camera: {err:#}");
                    slot.toaster.error(NO_CAMERA);
                }
            }
            slot.redraw.emit(());
        });
    }

    fn release(&self) {
        if let Some(stream) = self.stream.borrow_mut().take() {
            camera::stop(&stream, self.video.cast::<HtmlVideoElement>().as_ref());
        }
    }
}

#[function_component(CreateDevice)]
pub fn create_device(props: &Props) -> Html {
    let toaster = use_toaster();
    let name = use_state(String::new);
    let name_error = use_state(|| None::<String>);
    let submitting = use_state(|| false);
    let image = use_mut_ref(|| None::<ImageUpload>);
    let picker = use_mut_ref(ImagePicker::default);
    let stream = use_mut_ref(|| None::<MediaStream>);
    let video_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let force_update = use_force_update();

    let slot = CameraSlot {
        picker: picker.clone(),
        stream: stream.clone(),
        video: video_ref.clone(),
        toaster: toaster.clone(),
        redraw: Callback::from(move |_| force_update.force_update()),
    };

    // release camera and preview on unmount
    {
        let slot = slot.clone();
        use_effect_with((), move |_| {
            move || {
                slot.release();
                revoke(slot.picker.borrow_mut().clear());
            }
        });
    }

    let oninput = {
        let name = name.clone();
        Callback::from(move |e: InputEvent| {
            name.set(e.target_unchecked_into::<HtmlInputElement>().value());
        })
    };

    let on_tab = {
        let slot = slot.clone();
        move |tab: ImageTab| {
            let slot = slot.clone();
            Callback::from(move |_: MouseEvent| {
                let cmd = slot.picker.borrow_mut().select_tab(tab);
                slot.run(cmd);
            })
        }
    };

    let on_file = {
        let slot = slot.clone();
        let image = image.clone();
        Callback::from(move |e: Event| {
            let input = e.target_unchecked_into::<HtmlInputElement>();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            let slot = slot.clone();
            let image = image.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let bytes = match camera::blob_bytes(&file).await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        log::error!("cannot read {}: {err:#}", file.name());
                        return;
                    }
                };
                let preview = match Url::create_object_url_with_blob(&file) {
                    Ok(url) => url,
                    Err(err) => {
                        log::error!("cannot preview image: {:#}", utils::js_err(err));
                        return;
                    }
                };
                *image.borrow_mut() = Some(ImageUpload {
                    file_name: file.name(),
                    mime: file.type_(),
                    bytes,
                });
                revoke(slot.picker.borrow_mut().uploaded(preview));
                slot.redraw.emit(());
            });
        })
    };

    let on_capture = {
        let slot = slot.clone();
        let image = image.clone();
        let canvas_ref = canvas_ref.clone();
        Callback::from(move |_: MouseEvent| {
            let (Some(video), Some(canvas)) = (
                slot.video.cast::<HtmlVideoElement>(),
                canvas_ref.cast::<HtmlCanvasElement>(),
            ) else {
                return;
            };
            let slot = slot.clone();
            let image = image.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let captured = async {
                    let blob = camera::capture(&video, &canvas).await?;
                    let bytes = camera::blob_bytes(&blob).await?;
                    let preview = Url::create_object_url_with_blob(&blob).map_err(utils::js_err)?;
                    anyhow::Ok((bytes, preview))
                };
                match captured.await {
                    Ok((bytes, preview)) => {
                        *image.borrow_mut() = Some(ImageUpload {
                            file_name: form::CAPTURE_FILE_NAME.to_owned(),
                            mime: form::CAPTURE_MIME.to_owned(),
                            bytes,
                        });
                        let (old, cmd) = slot.picker.borrow_mut().captured(preview);
                        revoke(old);
                        slot.run(cmd);
                    }
                    Err(err) => {
                        log::error!("Error capturing image: {err:#}");
                        slot.toaster.error(NO_CAPTURE);
                    }
                }
            });
        })
    };

    let on_clear = {
        let slot = slot.clone();
        let image = image.clone();
        Callback::from(move |_: MouseEvent| {
            image.borrow_mut().take();
            revoke(slot.picker.borrow_mut().clear());
            slot.redraw.emit(());
        })
    };

    let onsubmit = {
        let name = name.clone();
        let name_error = name_error.clone();
        let submitting = submitting.clone();
        let image = image.clone();
        let slot = slot.clone();
        let toaster = toaster.clone();
        let on_success = props.on_success.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let draft = NewDevice {
                name: (*name).clone(),
                img: image.borrow().clone(),
            };
            let pending = match form::submit(&draft, request::streetgard_create) {
                Ok(pending) => pending,
                Err(errors) => {
                    name_error.set(form::field_error(&errors, "name"));
                    return;
                }
            };
            name_error.set(None);
            submitting.set(true);

            let name = name.clone();
            let submitting = submitting.clone();
            let image = image.clone();
            let slot = slot.clone();
            let toaster = toaster.clone();
            let on_success = on_success.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match pending.await {
                    Ok(device) => {
                        log::debug!("created street guard {}", device.id);
                        toaster.success(CREATED);
                        name.set(String::new());
                        image.borrow_mut().take();
                        let (old, cmd) = slot.picker.borrow_mut().reset();
                        revoke(old);
                        slot.run(cmd);
                        on_success.emit(device);
                    }
                    Err(err) => {
                        log::error!("Error creating street guard: {err:#}");
                        toaster.error(NOT_CREATED);
                    }
                }
                submitting.set(false);
            });
        })
    };

    let picker = picker.borrow();
    let tab_class = |tab: ImageTab| classes!("tab-pane", (picker.tab != tab).then_some("hidden"));
    let tabs = ImageTab::ALL.iter().map(|&tab| {
        let disabled = tab == ImageTab::Preview && !picker.can_preview();
        html! {
            <button type="button"
                class={classes!("tab", (picker.tab == tab).then_some("active"))}
                {disabled}
                onclick={on_tab(tab)}>
                {tab.label()}
            </button>
        }
    });

    html! {
        <form class="create-device" {onsubmit}>
            <div class="form-group">
                <label for="device-name">{"Device Name"}</label>
                <input id="device-name" type="text" class="form-control"
                    placeholder="Enter device name"
                    value={(*name).clone()} {oninput} />
                if let Some(err) = (*name_error).as_ref() {
                    <p class="field-error">{err.clone()}</p>
                }
            </div>

            <div class="form-group">
                <label>{"Device Image"}</label>
                <div class="tabs">{ for tabs }</div>

                <div class={tab_class(ImageTab::Upload)}>
                    <input type="file" accept="image/*" onchange={on_file} />
                </div>

                <div class={tab_class(ImageTab::Camera)}>
                    <video ref={video_ref} class="camera-view" autoplay=true playsinline=true muted=true />
                    <canvas ref={canvas_ref} class="hidden" />
                    <button type="button" class="btn btn-default"
                        disabled={!picker.camera_active}
                        onclick={on_capture}>
                        {"Capture"}
                    </button>
                </div>

                <div class={tab_class(ImageTab::Preview)}>
                    if let Some(src) = picker.preview.clone() {
                        <img class="image-preview" {src} alt="Device preview" />
                        <button type="button" class="btn btn-default" onclick={on_clear}>
                            {"Remove Image"}
                        </button>
                    }
                </div>
            </div>

            <button type="submit" class="btn btn-primary" disabled={*submitting}>
                { if *submitting { "Creating..." } else { "Create Street Guard" } }
            </button>
        </form>
    }
}
