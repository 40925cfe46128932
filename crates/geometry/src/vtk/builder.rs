// internal modules
use crate::vtk::convert::FluxToVtk;

// extrenal crates
use vtkio::model::ByteOrder;

/// Builder implementation for FluxToVtk configuration
///
/// The fields of [FluxToVtk] are left public for direct use but the module
/// also implements a builder.
///
/// To get the final [FluxToVtk] from the builder, call
/// [build()](FluxToVtkBuilder::build).
///
/// ```rust
/// # use critmc_geometry::vtk::FluxToVtk;
/// # use vtkio::model::ByteOrder;
/// let converter = FluxToVtk::builder()
///     .groups(vec![0, 1])
///     .include_total(true)
///     .byte_order(ByteOrder::LittleEndian)
///     .build();
///
/// assert_eq!(converter.groups, vec![0, 1]);
/// ```
pub struct FluxToVtkBuilder {
    /// Target energy group(s)
    groups: Vec<usize>,
    /// Include the sum over all groups
    include_total: bool,
    /// Include a fissile/non-fissile material map
    include_materials: bool,
    /// Byte ordering as big or little endian
    byte_order: ByteOrder,
}

impl FluxToVtkBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [FluxToVtk] type
    pub fn build(self) -> FluxToVtk {
        FluxToVtk {
            groups: self.groups,
            include_total: self.include_total,
            include_materials: self.include_materials,
            byte_order: self.byte_order,
        }
    }

    /// Energy groups to include, by index
    ///
    /// Defaults to every group when empty. Invalid indices are dropped.
    pub fn groups(mut self, groups: Vec<usize>) -> Self {
        self.groups = groups;
        self
    }

    /// Add a cell array of the flux summed over all groups
    pub fn include_total(mut self, include: bool) -> Self {
        self.include_total = include;
        self
    }

    /// Add a cell array marking fissile cells with 1.0
    pub fn include_materials(mut self, include: bool) -> Self {
        self.include_materials = include;
        self
    }

    /// Set the byte ordering
    ///
    /// Visit only reads big endian, so this is the default even though most
    /// systems are little endian.
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }
}

impl Default for FluxToVtkBuilder {
    fn default() -> Self {
        Self {
            groups: Vec::new(),
            include_total: false,
            include_materials: false,
            byte_order: ByteOrder::BigEndian,
        }
    }
}
