//! Reference and structural checks run after deserialization.
//!
//! serde already enforces required fields and value types. This pass checks
//! what the JSON schema cannot: every index is in bounds, and a handful of
//! cross-field rules hold. The first failure is returned.

use glint_core::{
    CameraType, Document, Element, GltfError, Index, Mesh, Primitive, Result,
};

/// Validate every cross reference and structural rule of `doc`.
pub fn validate(doc: &Document) -> Result<()> {
    if let Some(scene) = doc.scene {
        check(doc, scene, || "scene".to_string())?;
    }
    for (i, scene) in doc.scenes.iter().enumerate() {
        for &node in &scene.nodes {
            check(doc, node, || format!("scenes[{}].nodes", i))?;
        }
    }
    validate_nodes(doc)?;
    for (i, mesh) in doc.meshes.iter().enumerate() {
        validate_mesh(doc, i, mesh)?;
    }
    validate_accessors(doc)?;
    for (i, view) in doc.buffer_views.iter().enumerate() {
        check(doc, view.buffer, || format!("bufferViews[{}].buffer", i))?;
        if let Some(stride) = view.byte_stride {
            if stride != 0 && (!(4..=252).contains(&stride) || stride % 4 != 0) {
                return Err(GltfError::schema(format!(
                    "bufferViews[{}].byteStride {} is not a multiple of 4 in 4..=252",
                    i, stride
                )));
            }
        }
    }
    validate_materials(doc)?;
    validate_animations(doc)?;
    validate_skins_and_cameras(doc)?;
    Ok(())
}

fn check<T: Element>(doc: &Document, index: Index<T>, referrer: impl FnOnce() -> String) -> Result<()> {
    let len = T::arena(doc).len();
    if index.value() < len {
        Ok(())
    } else {
        Err(GltfError::out_of_range(referrer(), T::NAME, index.value(), len))
    }
}

fn validate_nodes(doc: &Document) -> Result<()> {
    let mut parent: Vec<Option<usize>> = vec![None; doc.nodes.len()];
    for (i, node) in doc.nodes.iter().enumerate() {
        for &child in &node.children {
            check(doc, child, || format!("nodes[{}].children", i))?;
            if let Some(first) = parent[child.value()].replace(i) {
                return Err(GltfError::schema(format!(
                    "nodes[{}] is a child of both nodes[{}] and nodes[{}]",
                    child.value(),
                    first,
                    i
                )));
            }
        }
        if let Some(mesh) = node.mesh {
            check(doc, mesh, || format!("nodes[{}].mesh", i))?;
        }
        if let Some(skin) = node.skin {
            check(doc, skin, || format!("nodes[{}].skin", i))?;
        }
        if let Some(camera) = node.camera {
            check(doc, camera, || format!("nodes[{}].camera", i))?;
        }
        if node.matrix.is_some() && node.has_trs() {
            return Err(GltfError::schema(format!(
                "nodes[{}] has both matrix and translation/rotation/scale",
                i
            )));
        }
    }
    Ok(())
}

fn validate_mesh(doc: &Document, i: usize, mesh: &Mesh) -> Result<()> {
    if mesh.primitives.is_empty() {
        return Err(GltfError::schema(format!("meshes[{}] has no primitives", i)));
    }
    for (p, primitive) in mesh.primitives.iter().enumerate() {
        let at = || format!("meshes[{}].primitives[{}]", i, p);
        for &accessor in primitive.attributes.values() {
            check(doc, accessor, || format!("{}.attributes", at()))?;
        }
        for target in &primitive.targets {
            for &accessor in target.values() {
                check(doc, accessor, || format!("{}.targets", at()))?;
            }
        }
        if let Some(indices) = primitive.indices {
            check(doc, indices, || format!("{}.indices", at()))?;
        }
        if let Some(material) = primitive.material {
            check(doc, material, || format!("{}.material", at()))?;
        }
        check_attribute_counts(doc, primitive).map_err(|message| {
            GltfError::schema(format!("{}: {}", at(), message))
        })?;
    }
    Ok(())
}

/// All attribute and morph target accessors of a primitive share one count.
fn check_attribute_counts(doc: &Document, primitive: &Primitive) -> std::result::Result<(), String> {
    let mut expected: Option<(&str, usize)> = None;
    let maps = std::iter::once(&primitive.attributes).chain(&primitive.targets);
    for (name, &accessor) in maps.flat_map(|map| map.iter()) {
        let count = doc.accessors[accessor.value()].count;
        match expected {
            None => expected = Some((name.as_str(), count)),
            Some((first, want)) if want != count => {
                return Err(format!(
                    "attribute {} has {} elements but {} has {}",
                    name, count, first, want
                ));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn validate_accessors(doc: &Document) -> Result<()> {
    for (i, accessor) in doc.accessors.iter().enumerate() {
        if let Some(view) = accessor.buffer_view {
            check(doc, view, || format!("accessors[{}].bufferView", i))?;
        }
        let Some(sparse) = &accessor.sparse else {
            continue;
        };
        if sparse.count > accessor.count {
            return Err(GltfError::schema(format!(
                "accessors[{}].sparse.count {} exceeds accessor count {}",
                i, sparse.count, accessor.count
            )));
        }
        if !sparse.indices.component_type.is_unsigned_integer() {
            return Err(GltfError::schema(format!(
                "accessors[{}].sparse.indices must use an unsigned integer type",
                i
            )));
        }
        check(doc, sparse.indices.buffer_view, || {
            format!("accessors[{}].sparse.indices.bufferView", i)
        })?;
        check(doc, sparse.values.buffer_view, || {
            format!("accessors[{}].sparse.values.bufferView", i)
        })?;
    }
    Ok(())
}

fn validate_materials(doc: &Document) -> Result<()> {
    for (i, material) in doc.materials.iter().enumerate() {
        for (slot, texture, _) in material.texture_slots() {
            check(doc, texture, || format!("materials[{}].{}", i, slot))?;
        }
    }
    for (i, texture) in doc.textures.iter().enumerate() {
        if let Some(sampler) = texture.sampler {
            check(doc, sampler, || format!("textures[{}].sampler", i))?;
        }
        if let Some(source) = texture.source {
            check(doc, source, || format!("textures[{}].source", i))?;
        }
    }
    for (i, image) in doc.images.iter().enumerate() {
        match (&image.uri, image.buffer_view) {
            (Some(_), Some(_)) => {
                return Err(GltfError::schema(format!(
                    "images[{}] has both uri and bufferView",
                    i
                )))
            }
            (None, None) => {
                return Err(GltfError::schema(format!(
                    "images[{}] has neither uri nor bufferView",
                    i
                )))
            }
            (None, Some(view)) => {
                check(doc, view, || format!("images[{}].bufferView", i))?;
                if image.mime_type.is_none() {
                    return Err(GltfError::schema(format!(
                        "images[{}] uses a bufferView without mimeType",
                        i
                    )));
                }
            }
            (Some(_), None) => {}
        }
    }
    Ok(())
}

fn validate_animations(doc: &Document) -> Result<()> {
    for (i, animation) in doc.animations.iter().enumerate() {
        for (c, channel) in animation.channels.iter().enumerate() {
            if channel.sampler.get(&animation.samplers).is_none() {
                return Err(GltfError::out_of_range(
                    format!("animations[{}].channels[{}]", i, c),
                    "animation sampler",
                    channel.sampler.value(),
                    animation.samplers.len(),
                ));
            }
            if let Some(node) = channel.target.node {
                check(doc, node, || format!("animations[{}].channels[{}].target", i, c))?;
            }
        }
        for (s, sampler) in animation.samplers.iter().enumerate() {
            check(doc, sampler.input, || format!("animations[{}].samplers[{}].input", i, s))?;
            check(doc, sampler.output, || format!("animations[{}].samplers[{}].output", i, s))?;
        }
    }
    Ok(())
}

fn validate_skins_and_cameras(doc: &Document) -> Result<()> {
    for (i, skin) in doc.skins.iter().enumerate() {
        if let Some(matrices) = skin.inverse_bind_matrices {
            check(doc, matrices, || format!("skins[{}].inverseBindMatrices", i))?;
        }
        if let Some(skeleton) = skin.skeleton {
            check(doc, skeleton, || format!("skins[{}].skeleton", i))?;
        }
        for &joint in &skin.joints {
            check(doc, joint, || format!("skins[{}].joints", i))?;
        }
    }
    for (i, camera) in doc.cameras.iter().enumerate() {
        let consistent = match camera.camera_type {
            CameraType::Perspective => camera.perspective.is_some(),
            CameraType::Orthographic => camera.orthographic.is_some(),
        };
        if !consistent {
            return Err(GltfError::schema(format!(
                "cameras[{}] is missing its {:?} parameters",
                i, camera.camera_type
            )));
        }
    }
    Ok(())
}
