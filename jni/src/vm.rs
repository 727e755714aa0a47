//! `JavaVM` and `JNIEnv` behind the runtime traits.

use std::ffi::{CStr, CString, c_void};
use std::ptr;

use jhost_core::{AttachError, CallArgs, Fault, ManagedRuntime, MarshalError, RuntimeEnv};
use jni_sys::{
    JNI_OK, JNI_TRUE, JNIEnv, JavaVM, jclass, jmethodID, jobject, jobjectArray, jsize, jstring,
    jvalue,
};

/// Call a function from a JNI function table.
///
/// Every table slot is an `Option`; a conforming runtime fills them all.
macro_rules! jni_call {
    ($table:expr, $name:ident $(, $arg:expr)* $(,)?) => {{
        let table = $table;
        match (**table).$name {
            Some(f) => Some(f(table $(, $arg)*)),
            None => None,
        }
    }};
}

const STRING_CLASS: &str = "java/lang/String";
const TO_STRING: &CStr = c"toString";
const TO_STRING_SIGNATURE: &CStr = c"()Ljava/lang/String;";

/// The process's one created `JavaVM`.
///
/// The library that exported it is never unloaded, so holding the pointer
/// is enough.
pub struct JniRuntime {
    vm: *mut JavaVM,
}

// The invocation interface is callable from any thread; each thread attaches
// before touching the runtime.
unsafe impl Send for JniRuntime {}
unsafe impl Sync for JniRuntime {}

impl JniRuntime {
    /// # Safety
    ///
    /// `vm` must come from a successful `JNI_CreateJavaVM` whose library
    /// stays mapped for the rest of the process.
    pub(crate) unsafe fn from_raw(vm: *mut JavaVM) -> Self {
        Self { vm }
    }
}

impl ManagedRuntime for JniRuntime {
    type Env = JniEnv;

    fn attach_current_thread(&self) -> Result<JniEnv, AttachError> {
        let mut env: *mut c_void = ptr::null_mut();
        let code = unsafe {
            jni_call!(self.vm, AttachCurrentThread, &raw mut env, ptr::null_mut())
        }
        .unwrap_or(jni_sys::JNI_ERR);
        if code != JNI_OK || env.is_null() {
            return Err(AttachError { code });
        }
        Ok(unsafe { JniEnv::from_raw(env.cast::<JNIEnv>()) })
    }

    fn detach_current_thread(&self) {
        let code = unsafe { jni_call!(self.vm, DetachCurrentThread) };
        if code != Some(JNI_OK) {
            tracing::warn!(code = ?code, "DetachCurrentThread failed");
        }
    }
}

/// A thread's `JNIEnv`. Not `Send`: it is only valid on the thread that got it.
pub struct JniEnv {
    env: *mut JNIEnv,
}

impl JniEnv {
    /// # Safety
    ///
    /// `env` must be a live `JNIEnv` for the calling thread.
    pub(crate) unsafe fn from_raw(env: *mut JNIEnv) -> Self {
        Self { env }
    }

    fn exception_pending(&mut self) -> bool {
        let pending = unsafe { jni_call!(self.env, ExceptionCheck) };
        pending == Some(JNI_TRUE)
    }

    fn clear_exception(&mut self) {
        unsafe {
            let _ = jni_call!(self.env, ExceptionClear);
        }
    }

    fn delete_local(&mut self, obj: jobject) {
        if !obj.is_null() {
            unsafe {
                let _ = jni_call!(self.env, DeleteLocalRef, obj);
            }
        }
    }

    fn new_string(&mut self, value: &str) -> Result<jstring, MarshalError> {
        let c_value = CString::new(value)
            .map_err(|_| MarshalError(format!("argument contains an interior NUL: {value:?}")))?;
        let string = unsafe { jni_call!(self.env, NewStringUTF, c_value.as_ptr()) }
            .unwrap_or(ptr::null_mut());
        if string.is_null() {
            self.clear_exception();
            return Err(MarshalError(format!("NewStringUTF failed for {value:?}")));
        }
        Ok(string)
    }

    /// Build a `String[]` holding `values` in order.
    fn string_array(&mut self, values: &[String]) -> Result<jobjectArray, MarshalError> {
        let string_class = self
            .find_class(STRING_CLASS)
            .ok_or_else(|| MarshalError("java/lang/String not found".into()))?;
        let len = jsize::try_from(values.len())
            .map_err(|_| MarshalError(format!("too many arguments: {}", values.len())))?;
        let array = unsafe {
            jni_call!(self.env, NewObjectArray, len, string_class, ptr::null_mut())
        }
        .unwrap_or(ptr::null_mut());
        self.delete_local(string_class);
        if array.is_null() {
            self.clear_exception();
            return Err(MarshalError("NewObjectArray failed".into()));
        }

        for (index, value) in values.iter().enumerate() {
            let element = match self.new_string(value) {
                Ok(element) => element,
                Err(e) => {
                    self.delete_local(array);
                    return Err(e);
                }
            };
            unsafe {
                let _ = jni_call!(
                    self.env,
                    SetObjectArrayElement,
                    array,
                    index as jsize,
                    element
                );
            }
            self.delete_local(element);
        }
        Ok(array)
    }

    /// `throwable.toString()`, if it can be had without raising again.
    fn describe_throwable(&mut self, throwable: jobject) -> Option<String> {
        let class = unsafe { jni_call!(self.env, GetObjectClass, throwable) }?;
        if class.is_null() {
            return None;
        }
        let method = unsafe {
            jni_call!(
                self.env,
                GetMethodID,
                class,
                TO_STRING.as_ptr(),
                TO_STRING_SIGNATURE.as_ptr()
            )
        }
        .unwrap_or(ptr::null_mut());
        self.delete_local(class);
        if method.is_null() {
            self.clear_exception();
            return None;
        }

        let text = unsafe { jni_call!(self.env, CallObjectMethodA, throwable, method, ptr::null()) }
            .unwrap_or(ptr::null_mut());
        if self.exception_pending() || text.is_null() {
            self.clear_exception();
            self.delete_local(text);
            return None;
        }

        let chars =
            unsafe { jni_call!(self.env, GetStringUTFChars, text, ptr::null_mut()) }
                .unwrap_or(ptr::null());
        let description = if chars.is_null() {
            None
        } else {
            let owned = unsafe { CStr::from_ptr(chars) }.to_string_lossy().into_owned();
            unsafe {
                let _ = jni_call!(self.env, ReleaseStringUTFChars, text, chars);
            }
            Some(owned)
        };
        self.delete_local(text);
        description
    }
}

impl RuntimeEnv for JniEnv {
    type Class = jclass;
    type Method = jmethodID;

    fn find_class(&mut self, name: &str) -> Option<jclass> {
        let c_name = CString::new(name).ok()?;
        let class =
            unsafe { jni_call!(self.env, FindClass, c_name.as_ptr()) }.unwrap_or(ptr::null_mut());
        if class.is_null() {
            // NoClassDefFoundError is pending; absence is the answer, not a fault.
            self.clear_exception();
            return None;
        }
        Some(class)
    }

    fn find_static_method(
        &mut self,
        class: jclass,
        name: &str,
        signature: &str,
    ) -> Option<jmethodID> {
        let c_name = CString::new(name).ok()?;
        let c_signature = CString::new(signature).ok()?;
        let method = unsafe {
            jni_call!(
                self.env,
                GetStaticMethodID,
                class,
                c_name.as_ptr(),
                c_signature.as_ptr()
            )
        }
        .unwrap_or(ptr::null_mut());
        if method.is_null() {
            self.clear_exception();
            return None;
        }
        Some(method)
    }

    fn call_static_void(
        &mut self,
        class: jclass,
        method: jmethodID,
        args: CallArgs<'_>,
    ) -> Result<(), MarshalError> {
        match args {
            CallArgs::None => unsafe {
                let _ = jni_call!(self.env, CallStaticVoidMethodA, class, method, ptr::null());
            },
            CallArgs::Strings(values) => {
                let array = self.string_array(values)?;
                let argv = [jvalue { l: array }];
                unsafe {
                    let _ = jni_call!(
                        self.env,
                        CallStaticVoidMethodA,
                        class,
                        method,
                        argv.as_ptr()
                    );
                }
                self.delete_local(array);
            }
        }
        Ok(())
    }

    fn take_fault(&mut self) -> Option<Fault> {
        if !self.exception_pending() {
            return None;
        }
        let throwable = unsafe { jni_call!(self.env, ExceptionOccurred) }.unwrap_or(ptr::null_mut());
        unsafe {
            let _ = jni_call!(self.env, ExceptionDescribe);
        }
        self.clear_exception();

        let description = if throwable.is_null() {
            None
        } else {
            let text = self.describe_throwable(throwable);
            self.delete_local(throwable);
            text
        };
        Some(Fault::new(
            description.unwrap_or_else(|| "unknown uncaught exception".to_string()),
        ))
    }
}
