//! Glue function emission
//!
//! One `unsafe extern "C"` function per exposed host function, shaped
//! exactly like its calling convention, forwarding to the runtime's
//! `glue::*` helpers.

use crate::convention::CallingConvention;
use crate::signature::TypeTag;

use super::{Plan, PlannedFunction};

/// Name of the glue function for `function`
pub fn glue_name(function: &str) -> String {
    format!("__pyglue_{function}")
}

/// Contents of `PythonFunctions+<target>.rs`
pub fn render_functions(plan: &Plan) -> String {
    let runtime = plan.config.runtime.path.as_str();
    let mut out = format!(
        "// @generated by pyglue from the `{module}` symbol manifests. Do not edit.\n\
         //\n\
         // Include from the crate root of the extension module:\n\
         //     include!(concat!(env!(\"OUT_DIR\"), \"/PythonFunctions+{target}.rs\"));\n",
        module = plan.module,
        target = plan.target,
    );

    for function in &plan.functions {
        out.push('\n');
        out.push_str(&render_function(function, runtime));
    }
    out
}

fn render_function(function: &PlannedFunction, runtime: &str) -> String {
    let signature = &function.signature;
    let name = &signature.name;
    let object = format!("*mut {runtime}::ffi::PyObject");

    let (parameters, head) = match function.convention {
        CallingConvention::NoArguments => (
            format!("_module: {object}, _unused: {object}"),
            format!("{runtime}::glue::no_arguments({name:?}, || {{"),
        ),
        CallingConvention::SinglePositional => (
            format!("_module: {object}, arg: {object}"),
            format!("{runtime}::glue::single_positional({name:?}, arg, |arg| {{"),
        ),
        CallingConvention::FastPositional => (
            format!("_module: {object}, args: *const {object}, nargs: {runtime}::ffi::Py_ssize_t"),
            format!(
                "{runtime}::glue::fast_positional({name:?}, args, nargs, {arity}, |args| {{",
                arity = signature.arity()
            ),
        ),
        CallingConvention::FastPositionalKeywords => unreachable!("keyword glue is rejected during planning"),
    };

    let mut body = String::new();
    let mut call_args = Vec::with_capacity(signature.arity());
    for (index, argument) in signature.arguments.iter().enumerate() {
        let source = match function.convention {
            CallingConvention::SinglePositional => "arg".to_string(),
            _ => format!("&args[{index}]"),
        };
        body.push_str(&format!(
            "        let arg{index} = {runtime}::convert::extract::<{ty}>({source})?;\n",
            ty = argument.ty.rust_type(runtime),
        ));
        call_args.push(format!("arg{index}"));
    }

    let call = format!("{}({})", signature.call_path(), call_args.join(", "));
    let call = match signature.error.as_deref() {
        None => call,
        Some(error) if is_bridge_error(error) => format!("{call}?"),
        Some(_) => format!("{call}.map_err({runtime}::PyError::from_host)?"),
    };

    match signature.returns.as_ref().unwrap_or(&TypeTag::Unit) {
        TypeTag::Unit => {
            body.push_str(&format!("        {call};\n        Ok(())\n"));
        }
        returns => {
            body.push_str(&format!(
                "        let result: {ty} = {call};\n        Ok(result)\n",
                ty = returns.rust_type(runtime)
            ));
        }
    }

    format!(
        "/// Glue for `{name}` ({convention})\n\
         #[doc(hidden)]\n\
         #[allow(clippy::missing_safety_doc)]\n\
         pub unsafe extern \"C\" fn {glue}({parameters}) -> {object} {{\n    \
             {head}\n\
         {body}    \
             }})\n\
         }}\n",
        convention = function.convention,
        glue = glue_name(name),
    )
}

/// Errors already in the runtime's error type pass through unchanged
fn is_bridge_error(error: &str) -> bool {
    error == "PyError" || error.ends_with("::PyError")
}
