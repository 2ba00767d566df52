//! Android backend: AHardwareBuffer, EGLImage import and GLES textures.
//!
//! Must be created and used on the thread that owns the current EGL context.

use std::ffi::c_void;
use std::ptr;

use khronos_egl as egl;
use ndk_sys as ffi;

use super::traits::*;

// AHardwareBuffer formats and usage bits (android/hardware_buffer.h)
const FORMAT_R8G8B8A8_UNORM: u32 = 1;
const FORMAT_B8G8R8A8_UNORM: u32 = 5;
const USAGE_CPU_READ_OFTEN: u64 = 3;
const USAGE_CPU_WRITE_OFTEN: u64 = 3 << 4;
const USAGE_GPU_SAMPLED_IMAGE: u64 = 1 << 8;
const USAGE_GPU_COLOR_OUTPUT: u64 = 1 << 9;

// EGL_ANDROID_image_native_buffer / EGL_KHR_image_base
const EGL_NATIVE_BUFFER_ANDROID: u32 = 0x3140;
const EGL_IMAGE_PRESERVED_KHR: i32 = 0x30D2;

type GetNativeClientBufferFn = unsafe extern "C" fn(*const ffi::AHardwareBuffer) -> *mut c_void;
type CreateImageFn =
    unsafe extern "C" fn(*mut c_void, *mut c_void, u32, *mut c_void, *const i32) -> *mut c_void;
type DestroyImageFn = unsafe extern "C" fn(*mut c_void, *mut c_void) -> u32;
type ImageTargetTextureFn = unsafe extern "C" fn(u32, *mut c_void);

/// Device backed by the current EGL context.
pub struct AndroidBackend {
    egl: egl::Instance<egl::Static>,
    display: egl::Display,
    get_native_client_buffer: GetNativeClientBufferFn,
    create_image: CreateImageFn,
    destroy_image: DestroyImageFn,
    image_target_texture: ImageTargetTextureFn,
}

// EGL displays are process-wide handles. Native calls themselves must still
// run on the context thread, which callers already guarantee.
unsafe impl Send for AndroidBackend {}
unsafe impl Sync for AndroidBackend {}

impl AndroidBackend {
    /// Bind to the EGL context current on this thread.
    ///
    /// Returns `None` if no context is current or a required extension entry
    /// point is missing.
    pub fn from_current_context() -> Option<Self> {
        let egl = egl::Instance::new(egl::Static);
        let display = egl.get_current_display()?;

        let load = |name: &str| -> Option<*const c_void> {
            let proc = egl.get_proc_address(name);
            if proc.is_none() {
                log::warn!("EGL entry point {} unavailable", name);
            }
            proc.map(|f| f as *const c_void)
        };

        let get_native_client_buffer = load("eglGetNativeClientBufferANDROID")?;
        let create_image = load("eglCreateImageKHR")?;
        let destroy_image = load("eglDestroyImageKHR")?;
        let image_target_texture = load("glEGLImageTargetTexture2DOES")?;

        gl::load_with(|name| load(name).unwrap_or(ptr::null()));

        // Each pointer was looked up by the name of the signature it is cast to.
        unsafe {
            Some(Self {
                get_native_client_buffer: std::mem::transmute::<*const c_void, GetNativeClientBufferFn>(
                    get_native_client_buffer,
                ),
                create_image: std::mem::transmute::<*const c_void, CreateImageFn>(create_image),
                destroy_image: std::mem::transmute::<*const c_void, DestroyImageFn>(destroy_image),
                image_target_texture: std::mem::transmute::<*const c_void, ImageTargetTextureFn>(
                    image_target_texture,
                ),
                egl,
                display,
            })
        }
    }

    fn raw_buffer(buffer: BufferHandle) -> *mut ffi::AHardwareBuffer {
        buffer.raw() as usize as *mut ffi::AHardwareBuffer
    }

    fn describe(buffer: *mut ffi::AHardwareBuffer) -> ffi::AHardwareBuffer_Desc {
        let mut desc: ffi::AHardwareBuffer_Desc = unsafe { std::mem::zeroed() };
        unsafe { ffi::AHardwareBuffer_describe(buffer, &mut desc) };
        desc
    }
}

// A lost context can report errors forever.
const MAX_GL_ERRORS: usize = 8;

/// Pop the pending GL error flags.
unsafe fn drain_gl_errors() -> Vec<u32> {
    std::iter::from_fn(|| match gl::GetError() {
        gl::NO_ERROR => None,
        code => Some(code),
    })
    .take(MAX_GL_ERRORS)
    .collect()
}

fn first_gl_error(errors: Vec<u32>) -> Result<(), u32> {
    match errors.first() {
        Some(&code) => Err(code),
        None => Ok(()),
    }
}

impl HardwareBufferBackend for AndroidBackend {
    fn allocate_buffer(
        &self,
        extent: Extent,
        cpu_access: bool,
        format: PixelFormat,
    ) -> Option<AllocatedBuffer> {
        let mut usage = USAGE_GPU_SAMPLED_IMAGE | USAGE_GPU_COLOR_OUTPUT;
        if cpu_access {
            usage |= USAGE_CPU_READ_OFTEN | USAGE_CPU_WRITE_OFTEN;
        }
        let desc = ffi::AHardwareBuffer_Desc {
            width: extent.width,
            height: extent.height,
            layers: 1,
            format: match format {
                PixelFormat::Bgra8888 => FORMAT_B8G8R8A8_UNORM,
                PixelFormat::Rgba8888 => FORMAT_R8G8B8A8_UNORM,
            },
            usage,
            stride: 0,
            rfu0: 0,
            rfu1: 0,
        };

        let mut buffer = ptr::null_mut();
        let status = unsafe { ffi::AHardwareBuffer_allocate(&desc, &mut buffer) };
        if status != 0 || buffer.is_null() {
            log::warn!("AHardwareBuffer_allocate failed: status={}", status);
            return None;
        }

        let described = Self::describe(buffer);
        Some(AllocatedBuffer {
            handle: BufferHandle::new(buffer as usize as u64)?,
            layout: BufferLayout {
                native_handle: 0,
                row_stride: described.stride,
            },
        })
    }

    fn map_buffer(&self, buffer: BufferHandle) -> Option<MappedRegion> {
        let raw = Self::raw_buffer(buffer);
        let mut address = ptr::null_mut();
        let status = unsafe {
            ffi::AHardwareBuffer_lock(
                raw,
                USAGE_CPU_READ_OFTEN | USAGE_CPU_WRITE_OFTEN,
                -1,
                ptr::null(),
                &mut address,
            )
        };
        if status != 0 {
            log::warn!("AHardwareBuffer_lock failed: status={}", status);
            return None;
        }

        let desc = Self::describe(raw);
        let len = desc.stride as usize * desc.height as usize * 4;
        // The lock stays held until release_buffer(.., true) unlocks it.
        unsafe { MappedRegion::from_raw(address.cast::<u8>(), len) }
    }

    fn import_buffer(&self, buffer: BufferHandle, texture: TextureId) -> Option<ImageHandle> {
        let client_buffer = unsafe { (self.get_native_client_buffer)(Self::raw_buffer(buffer)) };
        if client_buffer.is_null() {
            return None;
        }

        let attribs = [EGL_IMAGE_PRESERVED_KHR, egl::TRUE as i32, egl::NONE];
        let image = unsafe {
            (self.create_image)(
                self.display.as_ptr(),
                ptr::null_mut(),
                EGL_NATIVE_BUFFER_ANDROID,
                client_buffer,
                attribs.as_ptr(),
            )
        };
        if image.is_null() {
            log::warn!("eglCreateImageKHR failed: {:?}", self.egl.get_error());
            return None;
        }

        let status = unsafe {
            drain_gl_errors();
            gl::BindTexture(gl::TEXTURE_2D, texture.raw());
            (self.image_target_texture)(gl::TEXTURE_2D, image);
            let status = first_gl_error(drain_gl_errors());
            gl::BindTexture(gl::TEXTURE_2D, 0);
            status
        };
        if let Err(code) = status {
            log::warn!("glEGLImageTargetTexture2DOES failed: 0x{:04X}", code);
            unsafe { (self.destroy_image)(self.display.as_ptr(), image) };
            return None;
        }
        ImageHandle::new(image as usize as u64)
    }

    unsafe fn release_image(&self, image: ImageHandle) {
        unsafe { (self.destroy_image)(self.display.as_ptr(), image.raw() as usize as *mut c_void) };
    }

    unsafe fn release_buffer(&self, buffer: BufferHandle, was_locked: bool) {
        let raw = Self::raw_buffer(buffer);
        unsafe {
            if was_locked {
                ffi::AHardwareBuffer_unlock(raw, ptr::null_mut());
            }
            ffi::AHardwareBuffer_release(raw);
        }
    }
}

impl TextureBackend for AndroidBackend {
    fn create_texture(&self, desc: &TextureDesc) -> Option<TextureId> {
        let filter = match desc.filter {
            Filter::Linear => gl::LINEAR,
            Filter::Nearest => gl::NEAREST,
        } as i32;

        let mut id = 0;
        unsafe {
            gl::GenTextures(1, &mut id);
            gl::BindTexture(gl::TEXTURE_2D, id);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::BindTexture(gl::TEXTURE_2D, 0);
        }
        TextureId::new(id)
    }

    fn delete_texture(&self, texture: TextureId) {
        let id = texture.raw();
        unsafe { gl::DeleteTextures(1, &id) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gl_status() {
        assert_eq!(first_gl_error(Vec::new()), Ok(()));
        assert_eq!(
            first_gl_error(vec![gl::INVALID_OPERATION, gl::INVALID_VALUE]),
            Err(gl::INVALID_OPERATION)
        );
    }
}
