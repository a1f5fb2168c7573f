//! Module descriptor emission: method table, options and `PyInit_<target>`

use super::glue::glue_name;
use super::Plan;

/// Contents of `PythonModule+<target>.rs`
pub fn render_module(plan: &Plan) -> String {
    let runtime = plan.config.runtime.path.as_str();
    let target = &plan.target;
    let module = &plan.config.module;

    let entries: String = plan
        .functions
        .iter()
        .map(|function| {
            format!(
                "    {runtime}::MethodEntry::new({name:?}, {runtime}::MethodImpl::{variant}({glue}), {doc}),\n",
                name = function.signature.name,
                variant = function.convention.method_impl(),
                glue = glue_name(&function.signature.name),
                doc = optional_literal(function.doc.as_deref()),
            )
        })
        .collect();

    format!(
        "// @generated by pyglue from the `{source}` symbol manifests. Do not edit.\n\
         //\n\
         // Include next to PythonFunctions+{target}.rs:\n\
         //     include!(concat!(env!(\"OUT_DIR\"), \"/PythonModule+{target}.rs\"));\n\
         \n\
         static __PYGLUE_METHODS: [{runtime}::MethodEntry; {count}] = [\n\
         {entries}];\n\
         \n\
         static __PYGLUE_MODULE: {runtime}::ModuleDescriptor = {runtime}::ModuleDescriptor::new(\n    \
             {target:?},\n    \
             {doc},\n    \
             &__PYGLUE_METHODS,\n    \
             {runtime}::ModuleOptions {{\n        \
                 multiple_interpreters: {runtime}::MultipleInterpreters::{interpreters},\n        \
                 gil: {runtime}::GilMode::{gil},\n    \
             }},\n\
         );\n\
         \n\
         /// Loader entry point for `{target}`\n\
         #[no_mangle]\n\
         #[allow(non_snake_case, clippy::missing_safety_doc)]\n\
         pub unsafe extern \"C\" fn PyInit_{target}() -> *mut {runtime}::ffi::PyObject {{\n    \
             __PYGLUE_MODULE.initialize()\n\
         }}\n",
        source = plan.module,
        count = plan.functions.len(),
        doc = optional_literal(module.doc.as_deref()),
        interpreters = module.multiple_interpreters.runtime_variant(),
        gil = module.gil.runtime_variant(),
    )
}

fn optional_literal(text: Option<&str>) -> String {
    match text {
        Some(text) => format!("Some({text:?})"),
        None => "None".to_string(),
    }
}
