//! Handlebars helpers backed by the files root.

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
};

use crate::serve::FileSource;

/// `{{file "relative/path"}}`: inlines a text file from the files root.
#[derive(Debug, Clone)]
pub(super) struct FileHelper {
    files: FileSource,
}

impl FileHelper {
    pub(super) const NAME: &'static str = "file";

    pub(super) const fn new(files: FileSource) -> Self {
        Self { files }
    }
}

impl HelperDef for FileHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let path = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(Self::NAME, 0))?;

        let content = self
            .files
            .read_text(path)
            .map_err(|e| RenderErrorReason::Other(e.to_string()))?;

        out.write(&content)?;
        Ok(())
    }
}
