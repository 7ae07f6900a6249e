use crate::geometry::{FloatType, Ray, WorldBox};

use super::{Hit, Node, Object, SceneError};

/// Fixed size collection of child nodes.
///
/// Slots are filled one by one with [`Group::add_object`], the aggregate bounding
/// box is only final once every slot is filled.
#[derive(Clone, Debug)]
pub struct Group {
    children: Vec<Option<Node>>,
    bounding_box: WorldBox,
    /// False once any child without a bounding box was added
    bounded: bool,
}

impl Group {
    pub fn new(size: usize) -> Group {
        Group {
            children: std::iter::repeat_with(|| None).take(size).collect(),
            bounding_box: WorldBox::empty(),
            bounded: true,
        }
    }

    /// Places a child to the given slot and grows the group's bounding box by its box.
    pub fn add_object(&mut self, index: usize, object: impl Into<Node>) -> Result<(), SceneError> {
        let size = self.children.len();
        let slot = self
            .children
            .get_mut(index)
            .ok_or(SceneError::IndexOutOfRange { index, size })?;
        if slot.is_some() {
            return Err(SceneError::SlotOccupied { index });
        }

        let object = slot.insert(object.into());
        if let Some(child_box) = object.bounding_box() {
            self.bounding_box.union(&child_box);
        }
        self.bounded &= object.is_bounded();
        Ok(())
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// True if every child (recursively) has a bounding box, so that
    /// the group's box covers all of its geometry.
    pub fn is_bounded(&self) -> bool {
        self.bounded
    }

    pub fn is_complete(&self) -> bool {
        self.children.iter().all(Option::is_some)
    }

    /// Iterates over the filled slots, in index order.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flatten()
    }
}

impl Object for Group {
    /// Tests every child, so that the nearest hit among all of them ends up in `hit`.
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let mut found = false;
        for child in self.children() {
            found |= child.intersect(ray, hit, tmin);
        }
        found
    }

    /// Stops at the first child that reports an intersection.
    fn intersect_shadow_ray(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        self.children().any(|child| child.intersect(ray, hit, tmin))
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        Some(self.bounding_box.clone())
    }
}

impl FromIterator<Node> for Group {
    fn from_iter<T: IntoIterator<Item = Node>>(iter: T) -> Self {
        let mut bounding_box = WorldBox::empty();
        let mut bounded = true;
        let children = iter
            .into_iter()
            .map(|child| {
                if let Some(child_box) = child.bounding_box() {
                    bounding_box.union(&child_box);
                }
                bounded &= child.is_bounded();
                Some(child)
            })
            .collect();
        Group {
            children,
            bounding_box,
            bounded,
        }
    }
}
