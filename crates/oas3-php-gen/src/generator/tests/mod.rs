mod render;
mod support;
