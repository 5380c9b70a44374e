#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderableVerdict {
    Pass,
    Fail,
}

/// One report line, whichever shape the report entry had.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderableEntry {
    pub tag: String,
    pub description: Option<String>,
    pub control: Option<String>,
    /// Rule name, verbose reports only.
    pub name: Option<String>,
    pub observed: Option<String>,
    pub probe_error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderableData {
    pub rules_resolved: u32,
    pub rules_evaluated: u32,
    pub probe_failures: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderableReport {
    pub verdict: RenderableVerdict,
    pub host: String,
    pub tags: String,
    pub success: Vec<RenderableEntry>,
    pub failure: Vec<RenderableEntry>,
    pub controlled: Vec<RenderableEntry>,
    pub data: RenderableData,
}
