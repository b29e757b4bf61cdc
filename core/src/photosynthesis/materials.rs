//! ID material substitution

use crate::id::{IdRegistry, ObjectId};
use crate::scene::{ArcMaterial, Color, Material, Scene, Shading, Side};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// ID materials derived from display materials, keyed by the identity of
/// the display material and the object ID.
///
/// The display material is kept alive by the cache so its address cannot be
/// reused by another material.
#[derive(Debug, Default)]
pub struct MaterialCache {
    derived: HashMap<(usize, Option<ObjectId>), (ArcMaterial, ArcMaterial)>,
}

impl MaterialCache {
    /// Returns a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID material for an object, deriving it on first use.
    ///
    /// * `original` - Display material.
    /// * `id`       - Object ID; `None` for untracked objects.
    /// * `color`    - ID colour.
    pub fn id_material(
        &mut self,
        original: &ArcMaterial,
        id: Option<ObjectId>,
        color: Color,
    ) -> ArcMaterial {
        let key = (Arc::as_ptr(original) as usize, id);
        let (_, derived) = self.derived.entry(key).or_insert_with(|| {
            (
                ArcMaterial::clone(original),
                derive_id_material(original, color).into_arc(),
            )
        });
        ArcMaterial::clone(derived)
    }

    /// Returns the number of derived materials.
    pub fn len(&self) -> usize {
        self.derived.len()
    }

    /// Returns true if nothing was derived yet.
    pub fn is_empty(&self) -> bool {
        self.derived.is_empty()
    }

    /// Forgets every derived material.
    pub fn clear(&mut self) {
        self.derived.clear();
    }
}

/// Returns a flat, double-sided copy of `original` painted with `color`.
/// Features that would alter the colour are removed.
///
/// * `original` - Display material.
/// * `color`    - ID colour.
fn derive_id_material(original: &Material, color: Color) -> Material {
    if original.shading != Shading::Unlit {
        warn!(
            "Deriving an ID material from lit material '{}'; objects should provide their own",
            original.name
        );
    }
    if let Some(map) = original.map.as_ref() {
        warn!(
            "Removing texture '{}' from the ID material of '{}'",
            map, original.name
        );
    }

    Material {
        name: format!("{} (id)", original.name),
        shading: Shading::Unlit,
        color,
        side: Side::Double,
        instance_colors: false,
        map: None,
        ao_map: None,
        env_map: None,
    }
}

/// A scene with ID materials installed. Dropping it restores the display
/// materials and the background, also when a pass fails or panics.
pub(super) struct SwappedScene<'a> {
    /// The borrowed scene.
    scene: &'a mut dyn Scene,

    /// Display materials in visiting order.
    saved: Vec<ArcMaterial>,

    /// Display background.
    background: Color,
}

impl<'a> SwappedScene<'a> {
    /// Installs ID materials on every visible object and returns the guard
    /// together with the tracked IDs seen.
    ///
    /// Objects with an ID the registry never issued are painted black.
    ///
    /// * `scene`     - The scene.
    /// * `registry`  - Issued IDs and their colours.
    /// * `materials` - Derived material cache.
    pub fn install(
        scene: &'a mut dyn Scene,
        registry: &mut IdRegistry,
        materials: &mut MaterialCache,
    ) -> (Self, BTreeSet<ObjectId>) {
        let background = scene.background();
        let mut guard = Self {
            scene,
            saved: vec![],
            background,
        };
        let mut ids = BTreeSet::new();

        guard.scene.set_background(Color::BLACK);
        let saved = &mut guard.saved;
        guard.scene.visit_visible_mut(&mut |object| {
            let original = object.material();
            let id_material = match object.id_material() {
                Some(m) => m,
                None => {
                    let id = match object.photosynthesis_id() {
                        Some(id) if !registry.contains(id) => {
                            warn!("Object ID {id} was not issued here; painting it black");
                            None
                        }
                        id => id,
                    };
                    let color = registry.color_for(id);
                    materials.id_material(&original, id, color)
                }
            };
            ids.extend(
                object
                    .tracked_ids()
                    .into_iter()
                    .filter(|id| registry.contains(*id)),
            );
            saved.push(original);
            object.set_material(id_material);
        });

        (guard, ids)
    }

    /// Returns the scene with ID materials.
    pub fn scene(&self) -> &dyn Scene {
        &*self.scene
    }
}

impl Drop for SwappedScene<'_> {
    fn drop(&mut self) {
        let mut saved = std::mem::take(&mut self.saved).into_iter();
        self.scene.visit_visible_mut(&mut |object| {
            if let Some(material) = saved.next() {
                object.set_material(material);
            }
        });
        self.scene.set_background(self.background);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point3;
    use crate::id::encode_id;
    use crate::scene::fixtures::*;

    #[test]
    fn derived_materials_are_flat_double_sided_and_cached() {
        let mut cache = MaterialCache::new();
        let original = Material::lit("leaf", Color::WHITE).with_map("leaf.png").into_arc();
        let id = ObjectId::new(7);

        let a = cache.id_material(&original, Some(id), encode_id(id));
        let b = cache.id_material(&original, Some(id), encode_id(id));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.shading, Shading::Unlit);
        assert_eq!(a.side, Side::Double);
        assert_eq!(a.color, encode_id(id));
        assert_eq!(a.map, None);

        let other = cache.id_material(&original, None, Color::BLACK);
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn guard_restores_materials_and_background() {
        let mut registry = IdRegistry::new();
        let mut cache = MaterialCache::new();
        let id = registry.next_id().unwrap();
        let mut scene = TestScene::new(vec![
            Quad::horizontal(point3(0.0, 0.0, 0.0), 1.0).with_id(id),
            Quad::horizontal(point3(1.0, 0.0, 0.0), 1.0).with_id(ObjectId::new(40)),
            Quad::horizontal(point3(2.0, 0.0, 0.0), 1.0),
        ]);
        scene.background = Color::WHITE;
        let originals: Vec<ArcMaterial> =
            scene.objects.iter().map(|o| o.material.clone()).collect();

        {
            let (guard, ids) = SwappedScene::install(&mut scene, &mut registry, &mut cache);
            assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![id]);
            assert_eq!(guard.scene().background(), Color::BLACK);
            let mut colors = vec![];
            guard.scene().visit_visible(&mut |o| colors.push(o.material().color));
            assert_eq!(colors, vec![encode_id(id), Color::BLACK, Color::BLACK]);
        }

        assert_eq!(scene.background, Color::WHITE);
        for (object, original) in scene.objects.iter().zip(originals.iter()) {
            assert!(Arc::ptr_eq(&object.material, original));
        }
    }

    #[test]
    fn object_id_materials_are_used_as_is() {
        let mut registry = IdRegistry::new();
        let mut cache = MaterialCache::new();
        let id = registry.next_id().unwrap();
        let own = Material::basic("own", encode_id(id)).into_arc();
        let mut scene = TestScene::new(vec![Quad::horizontal(point3(0.0, 0.0, 0.0), 1.0)
            .with_id(id)
            .with_id_material(own.clone())]);

        let (guard, _) = SwappedScene::install(&mut scene, &mut registry, &mut cache);
        guard
            .scene()
            .visit_visible(&mut |o| assert!(Arc::ptr_eq(&o.material(), &own)));
        drop(guard);
        assert!(cache.is_empty());
    }
}
