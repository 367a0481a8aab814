/// Holds a view's loading flag up for as long as it lives, including when
/// the request future that owns it is dropped mid-await.
pub(crate) struct Busy<'a> {
    flag: &'a mut bool,
}

impl<'a> Busy<'a> {
    pub(crate) fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Busy { flag }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
