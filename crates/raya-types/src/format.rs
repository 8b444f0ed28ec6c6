//! Java-like, stable rendering of descriptors for diagnostics and logging.

use crate::descriptor::TypeDescriptor;
use crate::store::EntityCatalog;

/// Render `ty` the way it would be written in source: `java.util.List<? extends
/// java.lang.Number>`, `T[]`, `Outer<A>.Inner<B>`.
pub fn render_type(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> String {
    let mut out = String::new();
    write_type(cat, ty, &mut out);
    out
}

fn write_type(cat: &dyn EntityCatalog, ty: &TypeDescriptor, out: &mut String) {
    match ty {
        TypeDescriptor::Raw(entity) => out.push_str(&cat.entity_name(*entity)),
        TypeDescriptor::Parameterized(p) => {
            let name = cat.entity_name(p.entity);
            match p.owner.as_deref() {
                Some(owner) => {
                    write_type(cat, owner, out);
                    out.push('.');
                    out.push_str(name.rsplit('.').next().unwrap_or(&name));
                }
                None => out.push_str(&name),
            }
            if !p.args.is_empty() {
                out.push('<');
                for (idx, arg) in p.args.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    write_type(cat, arg, out);
                }
                out.push('>');
            }
        }
        TypeDescriptor::Array(component) => {
            write_type(cat, component, out);
            out.push_str("[]");
        }
        TypeDescriptor::Variable(var) => match cat.type_param(*var) {
            Some(tp) => out.push_str(&tp.name),
            None => out.push_str("<unknown-var>"),
        },
        TypeDescriptor::Wildcard(w) => {
            out.push('?');
            if !w.lower_bounds.is_empty() {
                out.push_str(" super ");
                write_bounds(cat, &w.lower_bounds, out);
            } else if !w.is_unbounded(cat.well_known().object) {
                out.push_str(" extends ");
                write_bounds(cat, &w.upper_bounds, out);
            }
        }
    }
}

fn write_bounds(cat: &dyn EntityCatalog, bounds: &[TypeDescriptor], out: &mut String) {
    for (idx, bound) in bounds.iter().enumerate() {
        if idx > 0 {
            out.push_str(" & ");
        }
        write_type(cat, bound, out);
    }
}
