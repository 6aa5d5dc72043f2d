/// Tolerances and defaults used by the editing operators.
#[derive(Debug, Clone, PartialEq)]
pub struct EditConfig {
    /// Distance used by [`EditMesh::extrude`](crate::EditMesh::extrude).
    pub extrude_distance: f32,
    /// When set, edge extrusion skips edges shared by two or more faces.
    pub perimeter_edge_extrusion_only: bool,
    /// When set, bridging refuses edges shared by more than one face.
    pub perimeter_edge_bridge_only: bool,
    /// Vertices of newly created faces closer than this are welded after
    /// connect, subdivide and poke.
    pub connect_weld_distance: f32,
    /// Default distance for [`EditMesh::weld_vertices_default`](crate::EditMesh::weld_vertices_default).
    pub weld_distance: f32,
    /// Triangles with an area at or below this are removed as degenerate.
    pub min_triangle_area: f32,
    /// Tolerance when rebuilding the shared registry from positions. `None`
    /// groups exactly equal positions only.
    pub position_epsilon: Option<f32>,
}

impl Default for EditConfig {
    fn default() -> Self {
        EditConfig {
            extrude_distance: 0.25,
            perimeter_edge_extrusion_only: true,
            perimeter_edge_bridge_only: true,
            connect_weld_distance: 1e-5,
            weld_distance: 0.01,
            min_triangle_area: 0.0,
            position_epsilon: None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::EditConfig;

    #[test]
    fn t_default_config() {
        let config = EditConfig::default();
        assert_eq!(config.extrude_distance, 0.25);
        assert!(config.perimeter_edge_bridge_only);
        assert!(config.position_epsilon.is_none());
    }
}
