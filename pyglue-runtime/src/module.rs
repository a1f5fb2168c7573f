//! Module descriptor - the `PyModuleDef` behind a generated `PyInit_*`
//!
//! A descriptor is a `static` built from `const` data by the generated
//! module file. The first loader call builds the method table, the slot
//! table and the definition itself, leaks them (they live as long as the
//! process) and caches the pointer; later calls only load it.

use core::ptr;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};
use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use pyo3::ffi;

use crate::context::{note_running_interpreter, with_inherited_access};
use crate::logging::log_module_built;

pub type NoArgsFn = unsafe extern "C" fn(*mut ffi::PyObject, *mut ffi::PyObject) -> *mut ffi::PyObject;
pub type SingleFn = unsafe extern "C" fn(*mut ffi::PyObject, *mut ffi::PyObject) -> *mut ffi::PyObject;
pub type FastFn =
    unsafe extern "C" fn(*mut ffi::PyObject, *const *mut ffi::PyObject, ffi::Py_ssize_t) -> *mut ffi::PyObject;
pub type FastKeywordsFn = unsafe extern "C" fn(
    *mut ffi::PyObject,
    *const *mut ffi::PyObject,
    ffi::Py_ssize_t,
    *mut ffi::PyObject,
) -> *mut ffi::PyObject;

// Slot ids and values newer than what the bindings expose
const PY_MOD_MULTIPLE_INTERPRETERS: c_int = 3;
const PY_MOD_GIL: c_int = 4;

/// One glue function per calling convention
#[derive(Clone, Copy)]
pub enum MethodImpl {
    NoArguments(NoArgsFn),
    SinglePositional(SingleFn),
    FastPositional(FastFn),
    FastPositionalKeywords(FastKeywordsFn),
}

impl MethodImpl {
    /// `ml_flags` for this convention
    pub fn flags(&self) -> c_int {
        match self {
            Self::NoArguments(_) => ffi::METH_NOARGS,
            Self::SinglePositional(_) => ffi::METH_O,
            Self::FastPositional(_) => ffi::METH_FASTCALL,
            Self::FastPositionalKeywords(_) => ffi::METH_FASTCALL | ffi::METH_KEYWORDS,
        }
    }

    fn pointer(self) -> ffi::PyMethodDefPointer {
        // The loader dispatches on `ml_flags`; the union only stores the
        // address, so every shape goes in through the plain-function field.
        let function: ffi::PyCFunction = match self {
            Self::NoArguments(f) | Self::SinglePositional(f) => f,
            Self::FastPositional(f) => unsafe { core::mem::transmute::<FastFn, ffi::PyCFunction>(f) },
            Self::FastPositionalKeywords(f) => unsafe {
                core::mem::transmute::<FastKeywordsFn, ffi::PyCFunction>(f)
            },
        };
        ffi::PyMethodDefPointer { PyCFunction: function }
    }
}

/// One exposed function
#[derive(Clone, Copy)]
pub struct MethodEntry {
    pub name: &'static str,
    pub implementation: MethodImpl,
    pub doc: Option<&'static str>,
}

impl MethodEntry {
    pub const fn new(name: &'static str, implementation: MethodImpl, doc: Option<&'static str>) -> Self {
        Self { name, implementation, doc }
    }

    fn to_method_def(self) -> ffi::PyMethodDef {
        ffi::PyMethodDef {
            ml_name: leak_c_string(self.name),
            ml_meth: self.implementation.pointer(),
            ml_flags: self.implementation.flags(),
            ml_doc: self.doc.map_or(ptr::null(), leak_c_string),
        }
    }
}

/// Sub-interpreter support declared to the loader (Python 3.12+)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleInterpreters {
    NotSupported,
    Supported,
    PerInterpreterGilSupported,
}

impl MultipleInterpreters {
    fn slot_value(self) -> usize {
        match self {
            Self::NotSupported => 0,
            Self::Supported => 1,
            Self::PerInterpreterGilSupported => 2,
        }
    }
}

/// Whether the module relies on the GIL (Python 3.13+)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GilMode {
    Used,
    NotUsed,
}

impl GilMode {
    fn slot_value(self) -> usize {
        match self {
            Self::Used => 0,
            Self::NotUsed => 1,
        }
    }
}

/// Execution-model capabilities of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleOptions {
    pub multiple_interpreters: MultipleInterpreters,
    pub gil: GilMode,
}

impl ModuleOptions {
    /// The runtime drives the interpreter through the GILState API, which
    /// only knows the main interpreter.
    pub const DEFAULT: Self = Self {
        multiple_interpreters: MultipleInterpreters::NotSupported,
        gil: GilMode::Used,
    };
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Loader-facing description of one extension module
pub struct ModuleDescriptor {
    name: &'static str,
    doc: Option<&'static str>,
    methods: &'static [MethodEntry],
    options: ModuleOptions,
    definition: AtomicPtr<ffi::PyModuleDef>,
    build_lock: Mutex<()>,
    builds: AtomicUsize,
}

impl ModuleDescriptor {
    pub const fn new(
        name: &'static str,
        doc: Option<&'static str>,
        methods: &'static [MethodEntry],
        options: ModuleOptions,
    ) -> Self {
        Self {
            name,
            doc,
            methods,
            options,
            definition: AtomicPtr::new(ptr::null_mut()),
            build_lock: parking_lot::const_mutex(()),
            builds: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn methods(&self) -> &'static [MethodEntry] {
        self.methods
    }

    /// The module definition, built on first use
    pub fn definition(&self) -> *mut ffi::PyModuleDef {
        let definition = self.definition.load(Ordering::Acquire);
        if !definition.is_null() {
            return definition;
        }

        let _guard = self.build_lock.lock();
        let definition = self.definition.load(Ordering::Acquire);
        if !definition.is_null() {
            return definition;
        }

        let definition = self.build();
        self.definition.store(definition, Ordering::Release);
        definition
    }

    /// How many times the definition was built (0 or 1)
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Body of the generated `PyInit_<module>` entry point
    ///
    /// # Safety
    /// - Must be called by the interpreter's loader (GIL held)
    pub unsafe fn initialize(&'static self) -> *mut ffi::PyObject {
        note_running_interpreter();
        with_inherited_access(|| ffi::PyModuleDef_Init(self.definition()))
    }

    fn build(&self) -> *mut ffi::PyModuleDef {
        let mut methods: Vec<ffi::PyMethodDef> = self.methods.iter().map(|entry| entry.to_method_def()).collect();
        methods.push(ffi::PyMethodDef::zeroed());

        let slots = self.slots(*PYTHON_VERSION);
        let slot_count = slots.len() - 1;

        let definition = Box::new(ffi::PyModuleDef {
            m_base: ffi::PyModuleDef_HEAD_INIT,
            m_name: leak_c_string(self.name),
            m_doc: self.doc.map_or(ptr::null(), leak_c_string),
            m_size: 0,
            m_methods: Box::leak(methods.into_boxed_slice()).as_mut_ptr(),
            m_slots: Box::leak(slots.into_boxed_slice()).as_mut_ptr(),
            m_traverse: None,
            m_clear: None,
            m_free: None,
        });

        self.builds.fetch_add(1, Ordering::Relaxed);
        log_module_built(self.name, self.methods.len(), slot_count);
        Box::into_raw(definition)
    }

    /// Slot table for an interpreter of `version`, zero-terminated
    pub(crate) fn slots(&self, version: (u32, u32)) -> Vec<ffi::PyModuleDef_Slot> {
        let mut slots = vec![ffi::PyModuleDef_Slot {
            slot: ffi::Py_mod_exec,
            value: exec_module as *mut c_void,
        }];
        if version >= (3, 12) {
            slots.push(ffi::PyModuleDef_Slot {
                slot: PY_MOD_MULTIPLE_INTERPRETERS,
                value: self.options.multiple_interpreters.slot_value() as *mut c_void,
            });
        }
        if version >= (3, 13) {
            slots.push(ffi::PyModuleDef_Slot {
                slot: PY_MOD_GIL,
                value: self.options.gil.slot_value() as *mut c_void,
            });
        }
        slots.push(ffi::PyModuleDef_Slot { slot: 0, value: ptr::null_mut() });
        slots
    }
}

/// Second loader phase; there is nothing to execute
unsafe extern "C" fn exec_module(_module: *mut ffi::PyObject) -> c_int {
    0
}

/// `(major, minor)` of the interpreter this process links against
static PYTHON_VERSION: Lazy<(u32, u32)> = Lazy::new(|| {
    let version = unsafe { CStr::from_ptr(ffi::Py_GetVersion()) };
    parse_version(&version.to_string_lossy())
});

fn parse_version(text: &str) -> (u32, u32) {
    let mut parts = text.split('.').map(|part| {
        part.chars()
            .take_while(char::is_ascii_digit)
            .collect::<String>()
            .parse::<u32>()
            .unwrap_or(0)
    });
    let major = parts.next().unwrap_or(0);
    let minor = parts.next().unwrap_or(0);
    (major, minor)
}

/// Process-lifetime C string for the definition tables
fn leak_c_string(text: &'static str) -> *const c_char {
    CString::new(text.replace('\0', "")).unwrap_or_default().into_raw()
}
