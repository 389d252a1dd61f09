//! Streaming state for one chunk at one LOD

/// Number of children a chunk has at the next finer LOD
pub const CHILD_COUNT: u8 = 4;

/// Streaming state for one chunk coordinate at one LOD.
///
/// `H` is the render sink's visual-object handle, `M` the synthesized mesh.
/// Fields are mutated only by the scheduler; hosts get read access.
#[derive(Debug)]
pub struct Chunk<H, M> {
    /// Owned by the live queue of its LOD
    pub(crate) in_live_queue: bool,
    /// A mesh-generation request is outstanding
    pub(crate) in_mesh_gen_queue: bool,
    /// Children (one LOD finer) that are visible or fully covered themselves
    pub(crate) pseudo_active_child_count: u8,
    /// Whether the chunk's geometry is shown
    pub(crate) visible: bool,
    /// Visual object created with the chunk, initially hidden
    pub(crate) render_handle: H,
    /// Synthesized geometry; set at most once
    pub(crate) mesh: Option<M>,
}

impl<H, M> Chunk<H, M> {
    /// Create a hidden, unmeshed chunk around a fresh visual object
    pub fn new(render_handle: H) -> Self {
        Self {
            in_live_queue: false,
            in_mesh_gen_queue: false,
            pseudo_active_child_count: 0,
            visible: false,
            render_handle,
            mesh: None,
        }
    }

    pub fn in_live_queue(&self) -> bool {
        self.in_live_queue
    }

    pub fn in_mesh_gen_queue(&self) -> bool {
        self.in_mesh_gen_queue
    }

    /// Geometry has been synthesized
    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn mesh(&self) -> Option<&M> {
        self.mesh.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn render_handle(&self) -> &H {
        &self.render_handle
    }

    pub fn pseudo_active_child_count(&self) -> u8 {
        self.pseudo_active_child_count
    }

    /// All four children cover this chunk's area
    pub fn is_pseudo_active(&self) -> bool {
        self.pseudo_active_child_count == CHILD_COUNT
    }

    /// Visible, or standing back because its children cover it.
    ///
    /// This is what a chunk reports to its parent's counter.
    pub fn is_effectively_active(&self) -> bool {
        self.visible || self.is_pseudo_active()
    }

    /// Add one covering child. Returns `false` (and leaves the counter at 4)
    /// if the chunk was already fully covered.
    pub(crate) fn add_covering_child(&mut self) -> bool {
        if self.pseudo_active_child_count >= CHILD_COUNT {
            self.pseudo_active_child_count = CHILD_COUNT;
            return false;
        }
        self.pseudo_active_child_count += 1;
        true
    }

    /// Remove one covering child. Returns `false` (and leaves the counter at 0)
    /// if no child was covering.
    pub(crate) fn remove_covering_child(&mut self) -> bool {
        if self.pseudo_active_child_count == 0 {
            return false;
        }
        self.pseudo_active_child_count -= 1;
        true
    }

    /// Store synthesized geometry. Hands the mesh back if one is already set.
    pub(crate) fn store_mesh(&mut self, mesh: M) -> Result<&M, M> {
        if self.mesh.is_some() {
            return Err(mesh);
        }
        Ok(self.mesh.insert(mesh))
    }
}
