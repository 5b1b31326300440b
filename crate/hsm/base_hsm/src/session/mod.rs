mod template;

pub(crate) use template::{NativeTemplate, ck_mechanism};
