//! Transient notifications shown in the corner of the window.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
}

impl Toast {
    pub fn error(message: impl Into<String>) -> Self {
        Toast {
            message: message.into(),
        }
    }
}

/// Toasts currently on screen, oldest first.
#[derive(Debug, Default)]
pub struct Toasts {
    next_id: usize,
    active: Vec<(usize, Toast)>,
}

impl Toasts {
    /// Show a toast and return the id used to dismiss it later.
    pub fn push(&mut self, toast: Toast) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        log::debug!("Toast {} shown: {}", id, toast.message);
        self.active.push((id, toast));
        id
    }

    /// Remove a toast. Unknown ids (already dismissed) are ignored.
    pub fn dismiss(&mut self, id: usize) {
        self.active.retain(|(i, _)| *i != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Toast)> {
        self.active.iter().map(|(id, t)| (*id, t))
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_that_toast() {
        let mut toasts = Toasts::default();
        let a = toasts.push(Toast::error("a"));
        let b = toasts.push(Toast::error("b"));
        assert_ne!(a, b);

        toasts.dismiss(a);
        let left: Vec<_> = toasts.iter().map(|(id, t)| (id, t.message.clone())).collect();
        assert_eq!(left, vec![(b, "b".to_string())]);
    }

    #[test]
    fn dismissing_twice_is_harmless() {
        let mut toasts = Toasts::default();
        let id = toasts.push(Toast::error("gone"));
        toasts.dismiss(id);
        toasts.dismiss(id);
        toasts.dismiss(99);
        assert!(toasts.is_empty());
    }
}
