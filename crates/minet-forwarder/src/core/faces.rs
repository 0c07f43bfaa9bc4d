//! Face registry: 从稳定的 face id 到具体 [`LogicFace`] 实现的映射。
//!
//! 不是单独建模的组件，而是 Forwarder/Strategy 都需要的"把 face id 变回
//! 可发送句柄"的胶水表，归到 core 模块下与其余表放在一起。

use std::sync::Arc;

use minet_core::LogicFace;

#[derive(Default)]
pub struct FaceRegistry {
    faces: dashmap::DashMap<u64, Arc<dyn LogicFace>>,
}

impl FaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { faces: dashmap::DashMap::new() }
    }

    pub fn register(&self, face: Arc<dyn LogicFace>) {
        self.faces.insert(face.id(), face);
    }

    pub fn unregister(&self, face_id: u64) {
        self.faces.remove(&face_id);
    }

    #[must_use]
    pub fn get(&self, face_id: u64) -> Option<Arc<dyn LogicFace>> {
        self.faces.get(&face_id).map(|r| Arc::clone(&r))
    }
}
