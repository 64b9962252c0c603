use super::meta::ObjectMeta;

/// Anything stored in the object store carries an [`ObjectMeta`].
pub trait KubeObject: Clone + Send + Sync + 'static {
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;
}
