use super::{FloatType, Ray, WorldBox};

impl WorldBox {
    /// Calculates ray intersection with the box.
    /// Returns minimum and maximum distance along the ray, ray intersects if min <= max.
    /// Distances may be negative if the box is (partially) behind the ray origin.
    pub fn intersect_ray(&self, ray: &Ray) -> (FloatType, FloatType) {
        // Zeros in direction get turned into positive infinity regardless of the sign of the zero
        let inv_direction = ray
            .direction
            .map(|x| if x == 0.0 { FloatType::INFINITY } else { 1.0 / x });

        // Componentwise distances along the ray to the box's min and max corners
        // The multiplication is NAN if the ray is starting inside the slab bounding plane
        // and is parallel to it. In this case we blend to +-infinity, so that the range becomes infinite
        let to_box_min = (self.min - ray.origin)
            .component_mul(&inv_direction)
            .map(|x| if x.is_nan() { FloatType::NEG_INFINITY } else { x });
        let to_box_max = (self.max - ray.origin)
            .component_mul(&inv_direction)
            .map(|x| if x.is_nan() { FloatType::INFINITY } else { x });

        // Correctly ordered (min_t <= max_t)
        let componentwise_min_t = to_box_min.zip_map(&to_box_max, FloatType::min);
        let componentwise_max_t = to_box_min.zip_map(&to_box_max, FloatType::max);

        (componentwise_min_t.max(), componentwise_max_t.min())
    }
}
