//! Rear camera access for the device creation form.

use anyhow::{anyhow, Result};
use common::form::{CAPTURE_MIME, CAPTURE_QUALITY};
use js_sys::{Function, Promise, Uint8Array};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};

use crate::utils;

/// Opens the environment-facing camera. The stream is not shown anywhere yet.
pub async fn open() -> Result<MediaStream> {
    let devices = web_sys::window()
        .ok_or_else(|| anyhow!("no window"))?
        .navigator()
        .media_devices()
        .map_err(utils::js_err)?;

    let constraints = utils::to_js(&serde_json::json!({
        "video": { "facingMode": "environment" }
    }))?
    .unchecked_into::<MediaStreamConstraints>();

    let stream = JsFuture::from(
        devices
            .get_user_media_with_constraints(&constraints)
            .map_err(utils::js_err)?,
    )
    .await
    .map_err(utils::js_err)?
    .dyn_into::<MediaStream>()
    .map_err(|_| anyhow!("getUserMedia did not return a stream"))?;

    log::debug!("camera opened");
    Ok(stream)
}

/// Shows `stream` in `video` and starts playback.
pub async fn attach(video: &HtmlVideoElement, stream: &MediaStream) -> Result<()> {
    video.set_src_object(Some(stream));
    JsFuture::from(video.play().map_err(utils::js_err)?)
        .await
        .map_err(utils::js_err)?;
    log::debug!("camera started");
    Ok(())
}

/// Stops every track of `stream` and detaches it from `video`.
pub fn stop(stream: &MediaStream, video: Option<&HtmlVideoElement>) {
    for track in stream.get_tracks().iter() {
        track.unchecked_into::<MediaStreamTrack>().stop();
    }
    if let Some(video) = video {
        video.set_src_object(None);
    }
    log::debug!("camera stopped");
}

/// Draws the current frame of `video` to `canvas` and encodes it as JPEG.
pub async fn capture(video: &HtmlVideoElement, canvas: &HtmlCanvasElement) -> Result<Blob> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(anyhow!("camera has no frame yet"));
    }
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx = canvas
        .get_context("2d")
        .map_err(utils::js_err)?
        .ok_or_else(|| anyhow!("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| anyhow!("unexpected canvas context"))?;
    ctx.draw_image_with_html_video_element_and_dw_and_dh(
        video,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )
    .map_err(utils::js_err)?;

    let encoded = Promise::new(&mut |resolve: Function, reject: Function| {
        let on_blob = Closure::once_into_js(move |blob: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &blob);
        });
        if let Err(err) = canvas.to_blob_with_type_and_encoder_options(
            on_blob.unchecked_ref(),
            CAPTURE_MIME,
            &JsValue::from_f64(CAPTURE_QUALITY),
        ) {
            let _ = reject.call1(&JsValue::NULL, &err);
        }
    });

    JsFuture::from(encoded)
        .await
        .map_err(utils::js_err)?
        .dyn_into::<Blob>()
        .map_err(|_| anyhow!("canvas could not be encoded"))
}

pub async fn blob_bytes(blob: &Blob) -> Result<Vec<u8>> {
    let buf = JsFuture::from(blob.array_buffer())
        .await
        .map_err(utils::js_err)?;
    Ok(Uint8Array::new(&buf).to_vec())
}
