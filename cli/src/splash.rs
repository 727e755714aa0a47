//! Startup splash: a borderless window showing a bitmap until the
//! application's own UI takes over.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicIsize, Ordering};

use jhost_core::Splash;

#[derive(Debug, Default)]
struct SplashState {
    shown: AtomicBool,
    closed: AtomicBool,
    /// The window handle once created, else 0.
    window: AtomicIsize,
}

/// Splash window driven from its own UI thread.
#[derive(Debug)]
pub struct BitmapSplash {
    image: PathBuf,
    state: Arc<SplashState>,
}

impl BitmapSplash {
    pub fn new(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            state: Arc::default(),
        }
    }

    #[cfg(test)]
    fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::SeqCst)
    }
}

impl Splash for BitmapSplash {
    fn show(&self) {
        if self.state.closed.load(Ordering::SeqCst) || self.state.shown.swap(true, Ordering::SeqCst)
        {
            return;
        }
        let image = self.image.clone();
        let state = Arc::clone(&self.state);
        let spawned = std::thread::Builder::new()
            .name("splash".into())
            .spawn(move || window::run(&image, &state));
        if let Err(e) = spawned {
            tracing::warn!("Failed to start splash thread: {e}");
        }
    }

    fn close(&self) {
        if self.state.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        window::close(self.state.window.load(Ordering::SeqCst));
        tracing::debug!("Splash closed");
    }
}

#[cfg(windows)]
mod window {
    use std::cell::Cell;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use std::{mem, ptr};

    use jhost_utils::to_wide_null;
    use windows_sys::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
    use windows_sys::Win32::Graphics::Gdi::{
        BITMAP, BeginPaint, BitBlt, CreateCompatibleDC, DeleteDC, DeleteObject, EndPaint,
        GetObjectW, HBITMAP, HGDIOBJ, PAINTSTRUCT, SRCCOPY, SelectObject,
    };
    use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
        GetSystemMetrics, IMAGE_BITMAP, LR_LOADFROMFILE, LoadImageW, MSG, PostMessageW,
        PostQuitMessage, RegisterClassW, SM_CXSCREEN, SM_CYSCREEN, SW_SHOW, ShowWindow,
        TranslateMessage, UpdateWindow, WM_CLOSE, WM_DESTROY, WM_PAINT, WNDCLASSW,
        WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
    };

    use super::SplashState;

    thread_local! {
        static BITMAP_HANDLE: Cell<HBITMAP> = const { Cell::new(ptr::null_mut()) };
    }

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                unsafe { paint(hwnd) };
                0
            }
            WM_DESTROY => {
                unsafe { PostQuitMessage(0) };
                0
            }
            _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
        }
    }

    unsafe fn paint(hwnd: HWND) {
        let bitmap = BITMAP_HANDLE.with(Cell::get);
        unsafe {
            let mut ps: PAINTSTRUCT = mem::zeroed();
            let hdc = BeginPaint(hwnd, &raw mut ps);
            let mut info: BITMAP = mem::zeroed();
            GetObjectW(
                bitmap as HGDIOBJ,
                mem::size_of::<BITMAP>() as i32,
                (&raw mut info).cast(),
            );
            let memory = CreateCompatibleDC(hdc);
            let previous = SelectObject(memory, bitmap as HGDIOBJ);
            BitBlt(hdc, 0, 0, info.bmWidth, info.bmHeight, memory, 0, 0, SRCCOPY);
            SelectObject(memory, previous);
            DeleteDC(memory);
            EndPaint(hwnd, &raw const ps);
        }
    }

    pub(super) fn run(image: &Path, state: &SplashState) {
        let wide_image = to_wide_null(image);
        let bitmap = unsafe {
            LoadImageW(
                ptr::null_mut(),
                wide_image.as_ptr(),
                IMAGE_BITMAP,
                0,
                0,
                LR_LOADFROMFILE,
            )
        } as HBITMAP;
        if bitmap.is_null() {
            tracing::debug!(path = %image.display(), "No splash bitmap; skipping splash");
            return;
        }
        BITMAP_HANDLE.with(|cell| cell.set(bitmap));

        let class_name = to_wide_null("JhostSplash");
        unsafe {
            let instance = GetModuleHandleW(ptr::null());
            let mut class: WNDCLASSW = mem::zeroed();
            class.lpfnWndProc = Some(window_proc);
            class.hInstance = instance;
            class.lpszClassName = class_name.as_ptr();
            RegisterClassW(&raw const class);

            let mut info: BITMAP = mem::zeroed();
            GetObjectW(
                bitmap as HGDIOBJ,
                mem::size_of::<BITMAP>() as i32,
                (&raw mut info).cast(),
            );
            let x = (GetSystemMetrics(SM_CXSCREEN) - info.bmWidth) / 2;
            let y = (GetSystemMetrics(SM_CYSCREEN) - info.bmHeight) / 2;

            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_TOPMOST,
                class_name.as_ptr(),
                ptr::null(),
                WS_POPUP,
                x,
                y,
                info.bmWidth,
                info.bmHeight,
                ptr::null_mut(),
                ptr::null_mut(),
                instance,
                ptr::null(),
            );
            if hwnd.is_null() {
                tracing::warn!("Failed to create splash window");
                DeleteObject(bitmap as HGDIOBJ);
                return;
            }
            state.window.store(hwnd as isize, Ordering::SeqCst);
            if state.closed.load(Ordering::SeqCst) {
                DestroyWindow(hwnd);
            } else {
                ShowWindow(hwnd, SW_SHOW);
                UpdateWindow(hwnd);
            }

            let mut msg: MSG = mem::zeroed();
            while GetMessageW(&raw mut msg, ptr::null_mut(), 0, 0) > 0 {
                TranslateMessage(&raw const msg);
                DispatchMessageW(&raw const msg);
            }
            state.window.store(0, Ordering::SeqCst);
            DeleteObject(bitmap as HGDIOBJ);
        }
    }

    pub(super) fn close(window: isize) {
        if window != 0 {
            unsafe {
                let _ = PostMessageW(window as HWND, WM_CLOSE, 0, 0);
            }
        }
    }
}

#[cfg(not(windows))]
mod window {
    use std::path::Path;

    use super::SplashState;

    pub(super) fn run(image: &Path, _state: &SplashState) {
        tracing::debug!(path = %image.display(), "Splash windows are not supported on this host");
    }

    pub(super) fn close(_window: isize) {}
}
